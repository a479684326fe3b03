//! Chunk command handler.
//!
//! Shows how a document would be split without calling any completion
//! service.

use super::{configured_tokenizer, print_json, read_input};
use clap::Args;
use precis_chunk::{delimited_chunks, interpolate_chunk_size, Chunk, ChunkPlan, Detail, Document};
use precis_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

/// Split a document into token-bounded chunks
#[derive(Args, Debug)]
pub struct ChunkCommand {
    /// Input file ("-" or omitted reads stdin)
    pub input: Option<PathBuf>,

    /// Detail level in [0, 1] used to pick the chunk size
    #[arg(short, long, conflicts_with = "max_tokens")]
    pub detail: Option<f64>,

    /// Fixed token budget per chunk
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Token floor per chunk when deriving the size from --detail
    #[arg(long)]
    pub min_chunk_size: Option<usize>,

    /// Literal delimiter between segments
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChunkCommand {
    /// Execute the chunk command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chunk command");
        tracing::debug!("Chunk command options: {:?}", self);

        let text = read_input(self.input.as_deref())?;
        let tokenizer = configured_tokenizer(config)?;
        let delimiter = self
            .delimiter
            .clone()
            .unwrap_or_else(|| config.summarize.chunk_delimiter.clone());

        let (plan, chunk_size) = match self.max_tokens {
            Some(max_tokens) => (None, max_tokens),
            None => {
                let detail = Detail::new(self.detail.unwrap_or(config.summarize.detail))?;
                let minimum = self
                    .min_chunk_size
                    .unwrap_or(config.summarize.minimum_chunk_size);
                let document = Document::new(&text, tokenizer.as_ref());
                let plan = interpolate_chunk_size(
                    &document,
                    detail,
                    minimum,
                    &delimiter,
                    tokenizer.as_ref(),
                )?;
                (Some(plan), plan.chunk_size)
            }
        };

        let chunks = delimited_chunks(&text, chunk_size, &delimiter, tokenizer.as_ref())?;
        tracing::info!("Produced {} chunks at {} tokens", chunks.len(), chunk_size);

        if self.json {
            print_json(&self.to_json(plan, chunk_size, &chunks)?)
        } else {
            for (i, chunk) in chunks.iter().enumerate() {
                println!(
                    "--- chunk {} ({} tokens, segments {:?}) ---",
                    i + 1,
                    chunk.token_count,
                    chunk.indices
                );
                println!("{}", chunk.text);
            }
            Ok(())
        }
    }

    fn to_json(
        &self,
        plan: Option<ChunkPlan>,
        chunk_size: usize,
        chunks: &[Chunk],
    ) -> AppResult<serde_json::Value> {
        Ok(serde_json::json!({
            "chunkSize": chunk_size,
            "plan": serde_json::to_value(plan)?,
            "chunks": serde_json::to_value(chunks)?,
        }))
    }
}
