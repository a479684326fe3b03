//! Segment splitting and the document handle.

use crate::tokenizer::Tokenizer;
use precis_core::{AppError, AppResult};

/// Split `text` on a literal delimiter into ordered segments.
///
/// The delimiter is removed. No trimming and no filtering: consecutive
/// delimiters yield empty segments, and an empty text yields one empty segment.
pub fn split_segments<'a>(text: &'a str, delimiter: &str) -> AppResult<Vec<&'a str>> {
    if delimiter.is_empty() {
        return Err(AppError::InvalidInput(
            "chunk delimiter must not be empty".to_string(),
        ));
    }

    Ok(text.split(delimiter).collect())
}

/// Input document with its total token count.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    pub text: &'a str,
    pub token_count: usize,
}

impl<'a> Document<'a> {
    /// Count the document once under `tokenizer`.
    pub fn new(text: &'a str, tokenizer: &dyn Tokenizer) -> Self {
        Self {
            text,
            token_count: tokenizer.count_tokens(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
