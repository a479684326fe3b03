//! Completion provider implementations.

mod mock;
mod ollama;
mod openai;

pub use mock::MockClient;
pub use ollama::OllamaClient;
pub use openai::{OpenAiClient, DEFAULT_OPENAI_URL};
