//! Options for a summarization run.

use precis_core::SummarizeConfig;
use precis_llm::LlmRequest;
use serde::{Deserialize, Serialize};

/// Parameters forwarded to the completion service on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Model identifier
    pub model: String,

    /// Sampling temperature; 0 keeps summaries as repeatable as the service allows
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Cap on generated tokens per chunk summary
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl ModelParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: Some(0.0),
            max_tokens: None,
        }
    }

    /// Build the request for one chunk.
    pub fn request(&self, system: &str, user: String) -> LlmRequest {
        let mut request = LlmRequest::new(user, &self.model).with_system(system);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }
}

/// Options recognized by [`crate::Summarizer::summarize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeOptions {
    /// Detail level in [0, 1]; validated when summarizing
    pub detail: f64,

    /// Token floor per chunk
    pub minimum_chunk_size: usize,

    /// Literal delimiter between atomic segments
    pub chunk_delimiter: String,

    /// Appended to the system instruction after a blank line
    pub additional_instructions: Option<String>,

    /// Carry earlier summaries forward into each prompt
    pub recursive: bool,

    /// Log chunk count and per-chunk token lengths at info level
    pub verbose: bool,

    /// Model parameters
    pub model: ModelParams,
}

impl SummarizeOptions {
    /// Defaults: detail 0, minimum chunk size 500, delimiter ".", non-recursive.
    pub fn new(model: ModelParams) -> Self {
        Self::from_config(&SummarizeConfig::default(), model)
    }

    /// Options seeded from the `summarize` config section.
    pub fn from_config(config: &SummarizeConfig, mut model: ModelParams) -> Self {
        model.temperature = Some(config.temperature);
        Self {
            detail: config.detail,
            minimum_chunk_size: config.minimum_chunk_size,
            chunk_delimiter: config.chunk_delimiter.clone(),
            additional_instructions: config.additional_instructions.clone(),
            recursive: config.recursive,
            verbose: false,
            model,
        }
    }

    pub fn with_detail(mut self, detail: f64) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_minimum_chunk_size(mut self, minimum_chunk_size: usize) -> Self {
        self.minimum_chunk_size = minimum_chunk_size;
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.chunk_delimiter = delimiter.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.additional_instructions = Some(instructions.into());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
