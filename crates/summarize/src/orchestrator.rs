//! Chunk-by-chunk summarization of a document.

use crate::options::SummarizeOptions;
use crate::progress::ProgressReporter;
use precis_chunk::{
    delimited_chunks, interpolate_chunk_size, Chunk, ChunkPlan, Detail, Document, Tokenizer,
};
use precis_core::AppResult;
use precis_llm::{LlmClient, LlmUsage};
use precis_prompt::{PromptBuilder, PromptTemplates, SUMMARY_SEPARATOR};
use serde::Serialize;
use std::sync::Arc;

/// Chunk plan plus the chunks the real pass produced.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryPlan {
    pub plan: ChunkPlan,
    pub chunks: Vec<Chunk>,
}

/// Result of a summarization run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Summary units joined with a blank line
    pub text: String,

    /// One summary per chunk, in document order
    pub units: Vec<String>,

    /// Chunk size decision for this run
    pub plan: ChunkPlan,

    /// Token count of each chunk sent to the service
    pub chunk_token_counts: Vec<usize>,

    /// Usage summed over every completion call
    pub usage: LlmUsage,
}

impl Summary {
    fn empty(plan: ChunkPlan) -> Self {
        Self {
            text: String::new(),
            units: Vec::new(),
            plan,
            chunk_token_counts: Vec::new(),
            usage: LlmUsage::default(),
        }
    }
}

/// Drives chunking, prompt construction and completion calls.
///
/// Calls are issued strictly one after another; in recursive mode each call
/// depends on every earlier summary.
pub struct Summarizer {
    client: Arc<dyn LlmClient>,
    tokenizer: Arc<dyn Tokenizer>,
    prompts: PromptBuilder,
    progress: ProgressReporter,
}

impl Summarizer {
    /// Create a summarizer with the built-in prompt templates.
    pub fn new(client: Arc<dyn LlmClient>, tokenizer: Arc<dyn Tokenizer>) -> AppResult<Self> {
        Ok(Self {
            client,
            tokenizer,
            prompts: PromptBuilder::new(&PromptTemplates::default())?,
            progress: ProgressReporter::noop(),
        })
    }

    /// Replace the prompt templates.
    pub fn with_templates(mut self, templates: &PromptTemplates) -> AppResult<Self> {
        self.prompts = PromptBuilder::new(templates)?;
        Ok(self)
    }

    /// Attach a progress reporter.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Decide the chunk size for `options.detail` and chunk the document at it.
    ///
    /// Makes no completion calls.
    pub fn plan(&self, text: &str, options: &SummarizeOptions) -> AppResult<SummaryPlan> {
        let detail = Detail::new(options.detail)?;
        let document = Document::new(text, self.tokenizer.as_ref());

        let plan = interpolate_chunk_size(
            &document,
            detail,
            options.minimum_chunk_size,
            &options.chunk_delimiter,
            self.tokenizer.as_ref(),
        )?;

        let chunks = if document.is_empty() {
            Vec::new()
        } else {
            delimited_chunks(
                text,
                plan.chunk_size,
                &options.chunk_delimiter,
                self.tokenizer.as_ref(),
            )?
        };

        Ok(SummaryPlan { plan, chunks })
    }

    /// Summarize `text` at the requested detail level.
    ///
    /// A completion failure on any chunk aborts the run and is returned as-is;
    /// no partial summary is kept.
    pub async fn summarize(&self, text: &str, options: &SummarizeOptions) -> AppResult<Summary> {
        let SummaryPlan { plan, chunks } = self.plan(text, options)?;

        if chunks.is_empty() {
            if plan.document_tokens == 0 {
                tracing::warn!("Document is empty, nothing to summarize");
            } else {
                tracing::warn!(
                    document_tokens = plan.document_tokens,
                    chunk_size = plan.chunk_size,
                    "Every segment overflowed the chunk size, nothing to summarize"
                );
            }
            return Ok(Summary::empty(plan));
        }

        let chunk_token_counts: Vec<usize> = chunks.iter().map(|c| c.token_count).collect();
        if options.verbose {
            tracing::info!("Splitting the text into {} chunks to be summarized.", chunks.len());
            tracing::info!("Chunk lengths are {:?}", chunk_token_counts);
        } else {
            tracing::debug!(
                chunks = chunks.len(),
                lengths = ?chunk_token_counts,
                "Chunked document"
            );
        }
        self.progress.chunked(chunks.len(), plan.chunk_size);

        let total = chunks.len();
        let mut units: Vec<String> = Vec::with_capacity(total);
        let mut usage = LlmUsage::default();

        for (index, chunk) in chunks.iter().enumerate() {
            let prompt = self.prompts.build(
                options.additional_instructions.as_deref(),
                &units,
                &chunk.text,
                options.recursive,
            )?;
            tracing::debug!(
                chunk = index + 1,
                recursive_context = prompt.metadata.recursive_context,
                prior_summaries = prompt.metadata.prior_summary_count,
                "Built prompt"
            );
            let request = options.model.request(&prompt.system, prompt.user);

            let response = match self.client.complete(&request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(
                        chunk = index + 1,
                        total,
                        provider = self.client.provider_name(),
                        "Summarization failed: {}",
                        e
                    );
                    return Err(e);
                }
            };

            tracing::debug!(
                chunk = index + 1,
                total,
                summary_chars = response.content.len(),
                "Chunk summarized"
            );

            usage.accumulate(&response.usage);
            units.push(response.content);
            self.progress.summarized(index + 1, total, chunk.token_count);
        }

        Ok(Summary {
            text: units.join(SUMMARY_SEPARATOR),
            units,
            plan,
            chunk_token_counts,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ModelParams;
    use crate::progress::ProgressEvent;
    use precis_chunk::CharTokenizer;
    use precis_core::AppError;
    use precis_llm::MockClient;
    use std::sync::Mutex;

    fn summarizer(client: Arc<MockClient>) -> Summarizer {
        Summarizer::new(client, Arc::new(CharTokenizer)).unwrap()
    }

    fn options() -> SummarizeOptions {
        SummarizeOptions::new(ModelParams::new("mock-model"))
    }

    // three 8-token segments; at minimum chunk size 10 each becomes its own chunk
    const THREE_PARTS: &str = "aaaaaaaa.bbbbbbbb.cccccccc";

    #[tokio::test]
    async fn test_short_document_single_call() {
        let text = "word ".repeat(83);
        let text = text.trim_end();
        assert_eq!(text.len(), 414);

        let client = Arc::new(MockClient::with_responses(["S1"]));
        let summary = summarizer(client.clone())
            .summarize(text, &options())
            .await
            .unwrap();

        assert_eq!(client.call_count(), 1);
        // whole document plus the re-attached delimiter
        assert_eq!(client.requests()[0].prompt, format!("{}.", text));
        assert_eq!(summary.text, "S1");
        assert_eq!(summary.units, vec!["S1"]);
        assert_eq!(summary.plan.num_chunks, 1);
        assert_eq!(summary.plan.chunk_size, 500);
        assert_eq!(summary.chunk_token_counts, vec![415]);
    }

    #[tokio::test]
    async fn test_detail_extremes_agree_on_short_document() {
        let text = "One short sentence. Another short sentence. A third";

        let low_client = Arc::new(MockClient::new());
        let low = summarizer(low_client.clone())
            .summarize(text, &options().with_detail(0.0))
            .await
            .unwrap();

        let high_client = Arc::new(MockClient::new());
        let high = summarizer(high_client.clone())
            .summarize(text, &options().with_detail(1.0))
            .await
            .unwrap();

        assert_eq!(low.text, high.text);
        assert_eq!(low_client.requests(), high_client.requests());
    }

    #[tokio::test]
    async fn test_non_recursive_sends_chunks_verbatim() {
        let client = Arc::new(MockClient::with_responses(["S1", "S2", "S3"]));
        let opts = options().with_detail(1.0).with_minimum_chunk_size(10);

        let summary = summarizer(client.clone())
            .summarize(THREE_PARTS, &opts)
            .await
            .unwrap();

        let prompts: Vec<String> = client.requests().into_iter().map(|r| r.prompt).collect();
        assert_eq!(prompts, vec!["aaaaaaaa.", "bbbbbbbb.", "cccccccc."]);
        assert_eq!(summary.text, "S1\n\nS2\n\nS3");
        assert_eq!(summary.chunk_token_counts, vec![9, 9, 9]);
    }

    #[tokio::test]
    async fn test_recursive_embeds_prior_summaries() {
        let client = Arc::new(MockClient::with_responses(["S1", "S2", "S3"]));
        let opts = options()
            .with_detail(1.0)
            .with_minimum_chunk_size(10)
            .with_instructions("Keep names.")
            .recursive(true);

        summarizer(client.clone())
            .summarize(THREE_PARTS, &opts)
            .await
            .unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].prompt, "aaaaaaaa.");
        assert_eq!(
            requests[1].prompt,
            "Previous summaries:\n\nS1\n\nText to summarize next:\n\nbbbbbbbb."
        );
        assert_eq!(
            requests[2].prompt,
            "Previous summaries:\n\nS1\n\nS2\n\nText to summarize next:\n\ncccccccc."
        );
        for request in &requests {
            assert_eq!(
                request.system.as_deref(),
                Some("Rewrite this text in summarized form.\n\nKeep names.")
            );
        }
    }

    #[tokio::test]
    async fn test_system_prompt_and_model_params() {
        let client = Arc::new(MockClient::new());
        let mut opts = options().with_instructions("Use bullet points.");
        opts.model.max_tokens = Some(200);

        summarizer(client.clone())
            .summarize("Some text to condense", &opts)
            .await
            .unwrap();

        let request = &client.requests()[0];
        assert_eq!(
            request.system.as_deref(),
            Some("Rewrite this text in summarized form.\n\nUse bullet points.")
        );
        assert_eq!(request.model, "mock-model");
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.max_tokens, Some(200));
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_chunks() {
        let client = Arc::new(MockClient::new().failing_on(2));
        let opts = options().with_detail(1.0).with_minimum_chunk_size(10);

        let result = summarizer(client.clone()).summarize(THREE_PARTS, &opts).await;

        assert!(matches!(result, Err(AppError::Llm(_))));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_detail_makes_no_calls() {
        let client = Arc::new(MockClient::new());
        let s = summarizer(client.clone());

        for detail in [-0.1, 1.5, f64::NAN] {
            let result = s.summarize(THREE_PARTS, &options().with_detail(detail)).await;
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_document_makes_no_calls() {
        let client = Arc::new(MockClient::new());
        let summary = summarizer(client.clone())
            .summarize("", &options())
            .await
            .unwrap();

        assert_eq!(summary.text, "");
        assert!(summary.units.is_empty());
        assert_eq!(summary.plan.document_tokens, 0);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_usage_accumulates() {
        let client = Arc::new(MockClient::new());
        let opts = options().with_detail(1.0).with_minimum_chunk_size(10);

        let summary = summarizer(client.clone())
            .summarize(THREE_PARTS, &opts)
            .await
            .unwrap();

        assert!(summary.usage.total_tokens > 0);
        assert_eq!(
            summary.usage.total_tokens,
            summary.usage.prompt_tokens + summary.usage.completion_tokens
        );
    }

    #[tokio::test]
    async fn test_progress_once_per_chunk() {
        let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let progress = ProgressReporter::new(Arc::new(move |event| {
            sink.lock().unwrap().push(event);
        }));

        let client = Arc::new(MockClient::new());
        let opts = options().with_detail(1.0).with_minimum_chunk_size(10);
        summarizer(client)
            .with_progress(progress)
            .summarize(THREE_PARTS, &opts)
            .await
            .unwrap();

        let captured = events.lock().unwrap();
        let summarized: Vec<u64> = captured
            .iter()
            .filter(|e| e.phase == "summarize")
            .map(|e| e.current)
            .collect();
        assert_eq!(summarized, vec![1, 2, 3]);
    }

    #[test]
    fn test_plan_without_calls() {
        let client = Arc::new(MockClient::new());
        let opts = options().with_detail(1.0).with_minimum_chunk_size(10);

        let plan = summarizer(client.clone()).plan(THREE_PARTS, &opts).unwrap();
        assert_eq!(plan.plan.max_chunks, 3);
        assert_eq!(plan.plan.num_chunks, 3);
        assert_eq!(plan.plan.chunk_size, 10);
        assert_eq!(plan.chunks.len(), 3);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_templates() {
        let templates = PromptTemplates {
            system: "Summarize tersely.".to_string(),
            ..PromptTemplates::default()
        };
        let client = Arc::new(MockClient::new());
        let s = summarizer(client.clone()).with_templates(&templates).unwrap();

        s.summarize("Text", &options()).await.unwrap();
        assert_eq!(
            client.requests()[0].system.as_deref(),
            Some("Summarize tersely.")
        );
    }
}
