//! Delimiter-based chunking of a whole document.

use crate::packer::{pack, Chunk, PackOptions};
use crate::segment::split_segments;
use crate::tokenizer::Tokenizer;
use precis_core::{AppError, AppResult};

/// Split `text` on `delimiter` and pack it into chunks of at most `max_tokens`.
///
/// Oversized segments are replaced by an ellipsis marker where it fits. The
/// delimiter is re-appended to every chunk, the last one included, and each
/// chunk's token count is recomputed for the re-appended text.
pub fn delimited_chunks(
    text: &str,
    max_tokens: usize,
    delimiter: &str,
    tokenizer: &dyn Tokenizer,
) -> AppResult<Vec<Chunk>> {
    if max_tokens == 0 {
        return Err(AppError::InvalidInput(
            "max_tokens must be at least 1".to_string(),
        ));
    }

    let segments = split_segments(text, delimiter)?;
    let options = PackOptions::new(max_tokens, delimiter).with_ellipsis();
    let packed = pack(&segments, &options, tokenizer);

    if packed.dropped_count > 0 {
        tracing::warn!(
            dropped = packed.dropped_count,
            max_tokens,
            "{} segments were dropped due to overflow",
            packed.dropped_count
        );
    }

    let chunks = packed
        .chunks
        .into_iter()
        .map(|mut chunk| {
            chunk.text.push_str(delimiter);
            chunk.token_count = tokenizer.count_tokens(&chunk.text);
            chunk
        })
        .collect();

    Ok(chunks)
}

/// Split `text` on `delimiter` into chunk strings of at most `max_tokens`
/// (plus the re-appended delimiter).
pub fn chunk_on_delimiter(
    text: &str,
    max_tokens: usize,
    delimiter: &str,
    tokenizer: &dyn Tokenizer,
) -> AppResult<Vec<String>> {
    Ok(delimited_chunks(text, max_tokens, delimiter, tokenizer)?
        .into_iter()
        .map(|chunk| chunk.text)
        .collect())
}
