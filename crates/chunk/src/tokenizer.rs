//! Token counting.
//!
//! All packing decisions go through a single [`Tokenizer`], so the probing
//! pass and the real pass always agree on sizes.

use precis_core::{AppError, AppResult};
use std::sync::Arc;
use tiktoken_rs::CoreBPE;

/// Encoding used when none is configured.
pub const DEFAULT_ENCODING: &str = "cl100k_base";

/// Pluggable token counter.
pub trait Tokenizer: Send + Sync {
    /// Count tokens in `text`. Must be deterministic.
    fn count_tokens(&self, text: &str) -> usize;

    /// Name of the encoding, for diagnostics.
    fn name(&self) -> &str;
}

/// BPE tokenizer backed by `tiktoken-rs`.
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
    encoding: &'static str,
}

impl TiktokenTokenizer {
    /// The `cl100k_base` encoding (GPT-4, GPT-3.5).
    pub fn cl100k_base() -> AppResult<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| AppError::Tokenizer(format!("Failed to load cl100k_base: {}", e)))?;
        Ok(Self {
            bpe,
            encoding: "cl100k_base",
        })
    }

    /// The `o200k_base` encoding (GPT-4o family).
    pub fn o200k_base() -> AppResult<Self> {
        let bpe = tiktoken_rs::o200k_base()
            .map_err(|e| AppError::Tokenizer(format!("Failed to load o200k_base: {}", e)))?;
        Ok(Self {
            bpe,
            encoding: "o200k_base",
        })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        // Special-token text is counted as ordinary text
        self.bpe.encode_ordinary(text).len()
    }

    fn name(&self) -> &str {
        self.encoding
    }
}

/// Rough `bytes / 3` estimate, no vocabulary needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesEstimateTokenizer;

impl Tokenizer for BytesEstimateTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        (text.len() + 2) / 3
    }

    fn name(&self) -> &str {
        "bytes-estimate"
    }
}

/// One token per `char`. Exact and predictable; an upper bound for BPE counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count()
    }

    fn name(&self) -> &str {
        "chars"
    }
}

/// Create a tokenizer by encoding name.
///
/// Accepted names: `cl100k_base`, `o200k_base`, `bytes-estimate` (or `bytes`),
/// `chars`.
pub fn create_tokenizer(name: &str) -> AppResult<Arc<dyn Tokenizer>> {
    let tokenizer: Arc<dyn Tokenizer> = match name.to_lowercase().as_str() {
        "cl100k_base" | "cl100k" => Arc::new(TiktokenTokenizer::cl100k_base()?),
        "o200k_base" | "o200k" => Arc::new(TiktokenTokenizer::o200k_base()?),
        "bytes" | "bytes-estimate" => Arc::new(BytesEstimateTokenizer),
        "chars" => Arc::new(CharTokenizer),
        _ => {
            return Err(AppError::Tokenizer(format!(
                "Unknown tokenizer: '{}'. Supported: cl100k_base, o200k_base, bytes-estimate, chars",
                name
            )))
        }
    };

    tracing::debug!("Using tokenizer: {}", tokenizer.name());

    Ok(tokenizer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_tokenizer() {
        assert_eq!(CharTokenizer.count_tokens(""), 0);
        assert_eq!(CharTokenizer.count_tokens("héllo"), 5);
    }

    #[test]
    fn test_bytes_estimate() {
        assert_eq!(BytesEstimateTokenizer.count_tokens(""), 0);
        assert_eq!(BytesEstimateTokenizer.count_tokens("abc"), 1);
        assert_eq!(BytesEstimateTokenizer.count_tokens("abcd"), 2);
    }

    #[test]
    fn test_cl100k_counts() {
        let tokenizer = TiktokenTokenizer::cl100k_base().unwrap();
        assert_eq!(tokenizer.count_tokens(""), 0);
        assert_eq!(tokenizer.count_tokens("hello world"), 2);
        assert_eq!(tokenizer.name(), "cl100k_base");
    }

    #[test]
    fn test_special_token_text_is_ordinary() {
        let tokenizer = TiktokenTokenizer::cl100k_base().unwrap();
        assert!(tokenizer.count_tokens("<|endoftext|>") > 1);
    }

    #[test]
    fn test_create_tokenizer_by_name() {
        assert_eq!(create_tokenizer("chars").unwrap().name(), "chars");
        assert_eq!(create_tokenizer("bytes").unwrap().name(), "bytes-estimate");
        assert_eq!(create_tokenizer("CL100K_BASE").unwrap().name(), "cl100k_base");
        assert_eq!(create_tokenizer("o200k").unwrap().name(), "o200k_base");
    }

    #[test]
    fn test_create_tokenizer_unknown() {
        assert!(matches!(
            create_tokenizer("sentencepiece"),
            Err(AppError::Tokenizer(_))
        ));
    }
}
