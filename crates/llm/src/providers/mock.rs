//! Offline mock provider.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use precis_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Words of the user message echoed back when no scripted reply is queued.
const ECHO_WORDS: usize = 12;

/// Mock provider for testing and dry runs.
///
/// Replies with queued scripted responses first, then with a deterministic
/// digest of the user message (`"[summary N] <first words>"`). Every request is
/// recorded so callers can inspect exactly what was sent. A failure can be
/// injected on the N-th call (1-based).
#[derive(Debug, Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<LlmRequest>>,
    fail_on_call: Option<usize>,
}

impl MockClient {
    /// Create a mock with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue scripted responses, consumed in order.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Fail the `call`-th completion (1-based) with a service error.
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of completions attempted so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    fn echo(call: usize, prompt: &str) -> String {
        let words: Vec<&str> = prompt.split_whitespace().take(ECHO_WORDS).collect();
        format!("[summary {}] {}", call, words.join(" "))
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let call = {
            let mut requests = self
                .requests
                .lock()
                .map_err(|_| AppError::Llm("Mock request log poisoned".to_string()))?;
            requests.push(request.clone());
            requests.len()
        };

        if self.fail_on_call == Some(call) {
            tracing::debug!(call, "Mock provider injecting failure");
            return Err(AppError::Llm(format!("Mock failure on call {}", call)));
        }

        let scripted = self
            .responses
            .lock()
            .map_err(|_| AppError::Llm("Mock response queue poisoned".to_string()))?
            .pop_front();

        let content = scripted.unwrap_or_else(|| Self::echo(call, &request.prompt));

        let prompt_len = request.prompt.len() + request.system.as_ref().map_or(0, String::len);
        let usage = LlmUsage::new((prompt_len / 4) as u32, (content.len() / 4) as u32);

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage,
        })
    }
}
