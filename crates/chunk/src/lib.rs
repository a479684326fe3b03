//! Token-bounded chunking for Precis.
//!
//! Pipeline, leaves first:
//! - [`tokenizer`]: token counting oracle (`tiktoken-rs` encodings and estimators)
//! - [`segment`]: literal delimiter splitting into atomic segments
//! - [`packer`]: greedy bin-packing of segments into chunks
//! - [`delimited`]: split + pack + delimiter re-attachment
//! - [`detail`]: detail level to chunk size interpolation

pub mod delimited;
pub mod detail;
pub mod packer;
pub mod segment;
pub mod tokenizer;

// Re-export commonly used types
pub use delimited::{chunk_on_delimiter, delimited_chunks};
pub use detail::{interpolate_chunk_size, target_chunk_count, ChunkPlan, Detail};
pub use packer::{pack, Chunk, PackOptions, PackResult, ELLIPSIS};
pub use segment::{split_segments, Document};
pub use tokenizer::{
    create_tokenizer, BytesEstimateTokenizer, CharTokenizer, TiktokenTokenizer, Tokenizer,
    DEFAULT_ENCODING,
};
