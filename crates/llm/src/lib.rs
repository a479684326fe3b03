//! Completion service integration for Precis.
//!
//! This crate provides a provider-agnostic abstraction for sending one
//! system instruction plus one user message to a language model and getting
//! text back.
//!
//! # Providers
//! - **OpenAI**: chat-completions API
//! - **Ollama**: local LLM runtime (default)
//! - **Mock**: deterministic offline replies for tests and dry runs
//!
//! # Example
//! ```no_run
//! use precis_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2")
//!     .with_system("Rewrite this text in summarized form.");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{MockClient, OllamaClient, OpenAiClient};
pub use types::ProviderType;
