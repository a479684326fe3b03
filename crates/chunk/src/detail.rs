//! Mapping a detail level to a chunk size.
//!
//! The finest granularity is probed by chunking the document at the minimum
//! chunk size; `detail` then interpolates linearly between one chunk and that
//! maximum.

use crate::delimited::delimited_chunks;
use crate::segment::Document;
use crate::tokenizer::Tokenizer;
use precis_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized detail level in `[0, 1]`. 0 is the shortest summary.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Detail(f64);

impl Detail {
    pub const MIN: Detail = Detail(0.0);
    pub const MAX: Detail = Detail(1.0);

    /// Validate a raw detail value.
    pub fn new(value: f64) -> AppResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(AppError::InvalidInput(format!(
                "detail must be within [0, 1], got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Detail {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Detail::new(value).map_err(serde::de::Error::custom)
    }
}

/// Result of interpolating a detail level against a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPlan {
    /// Token count of the whole document
    pub document_tokens: usize,

    /// Chunks produced when probing at the minimum chunk size
    pub max_chunks: usize,

    /// Target number of chunks for this detail level (at least 1)
    pub num_chunks: usize,

    /// Token budget for the real chunking pass
    pub chunk_size: usize,
}

/// Number of chunks to aim for, given the probed maximum.
///
/// `floor(1 + detail * (max_chunks - 1))`, clamped to at least 1 so that a
/// probe that produced no chunks cannot cause a division by zero.
pub fn target_chunk_count(detail: Detail, max_chunks: usize) -> usize {
    let min_chunks = 1.0;
    let span = max_chunks as f64 - min_chunks;
    let interpolated = (min_chunks + detail.value() * span).floor();

    if interpolated < 1.0 {
        1
    } else {
        interpolated as usize
    }
}

/// Compute the chunk size for the real chunking pass.
pub fn interpolate_chunk_size(
    document: &Document<'_>,
    detail: Detail,
    minimum_chunk_size: usize,
    delimiter: &str,
    tokenizer: &dyn Tokenizer,
) -> AppResult<ChunkPlan> {
    if minimum_chunk_size == 0 {
        return Err(AppError::InvalidInput(
            "minimum_chunk_size must be at least 1".to_string(),
        ));
    }

    let max_chunks = delimited_chunks(document.text, minimum_chunk_size, delimiter, tokenizer)?.len();
    let num_chunks = target_chunk_count(detail, max_chunks);
    let chunk_size = minimum_chunk_size.max(document.token_count / num_chunks);

    let plan = ChunkPlan {
        document_tokens: document.token_count,
        max_chunks,
        num_chunks,
        chunk_size,
    };

    tracing::debug!(
        detail = detail.value(),
        document_tokens = plan.document_tokens,
        max_chunks = plan.max_chunks,
        num_chunks = plan.num_chunks,
        chunk_size = plan.chunk_size,
        "Interpolated chunk size"
    );

    Ok(plan)
}
