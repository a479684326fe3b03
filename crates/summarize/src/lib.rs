//! Summarization orchestration for Precis.
//!
//! Ties the chunker, prompt builder and completion client together: pick a
//! chunk size from the requested detail level, chunk the document, summarize
//! each chunk in order and join the results.

pub mod options;
pub mod orchestrator;
pub mod progress;

pub use options::{ModelParams, SummarizeOptions};
pub use orchestrator::{Summarizer, Summary, SummaryPlan};
pub use progress::{ProgressCallback, ProgressEvent, ProgressReporter};
