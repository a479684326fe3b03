//! Prompt system for Precis.
//!
//! This crate builds the two messages sent for every chunk:
//! - the system instruction, optionally extended with caller instructions
//! - the user message, either the raw chunk or, in recursive mode, the
//!   earlier summaries followed by the chunk
//!
//! Templates are Handlebars strings and can be overridden from YAML.

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{PromptBuilder, SUMMARY_SEPARATOR};
pub use loader::{load_templates, validate_templates};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptTemplates, DEFAULT_RECURSIVE_USER_TEMPLATE,
    DEFAULT_SYSTEM_TEMPLATE,
};
