//! Summarize command handler.

use super::{configured_tokenizer, print_json, read_input};
use clap::Args;
use precis_core::{config::AppConfig, AppError, AppResult};
use precis_llm::create_client;
use precis_prompt::load_templates;
use precis_summarize::{
    ModelParams, ProgressEvent, ProgressReporter, SummarizeOptions, Summarizer, Summary,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Summarize a document at a chosen level of detail
#[derive(Args, Debug)]
pub struct SummarizeCommand {
    /// Input file ("-" or omitted reads stdin)
    pub input: Option<PathBuf>,

    /// Detail level in [0, 1]; 0 is the shortest summary
    #[arg(short, long)]
    pub detail: Option<f64>,

    /// Token floor per chunk
    #[arg(long)]
    pub min_chunk_size: Option<usize>,

    /// Literal delimiter between segments
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Feed earlier summaries into each later prompt
    #[arg(short, long)]
    pub recursive: bool,

    /// Extra instructions appended to the system prompt
    #[arg(short, long)]
    pub instructions: Option<String>,

    /// Temperature for each completion
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens per chunk summary
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// YAML file overriding the prompt templates
    #[arg(long)]
    pub prompts: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SummarizeCommand {
    /// Execute the summarize command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing summarize command");
        tracing::debug!("Summarize command options: {:?}", self);

        let text = read_input(self.input.as_deref())?;
        let options = self.options(config);

        let api_key = config.resolve_api_key(&config.provider);
        let client = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            api_key.as_deref(),
        )
        .map_err(AppError::Config)?;
        let tokenizer = configured_tokenizer(config)?;

        let mut summarizer = Summarizer::new(client, tokenizer)?;
        if let Some(ref path) = self.prompts {
            let templates = load_templates(path)?;
            summarizer = summarizer.with_templates(&templates)?;
        }
        if config.verbose && !self.json {
            let progress = ProgressReporter::new(Arc::new(|event: ProgressEvent| {
                eprintln!("{}", event.format_simple());
            }));
            summarizer = summarizer.with_progress(progress);
        }

        let summary = summarizer.summarize(&text, &options).await?;

        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            summary.usage.prompt_tokens,
            summary.usage.completion_tokens,
            summary.usage.total_tokens
        );

        if self.json {
            print_json(&self.to_json(config, &options, &summary)?)
        } else {
            println!("{}", summary.text);
            Ok(())
        }
    }

    /// Config defaults with command-line flags applied on top.
    fn options(&self, config: &AppConfig) -> SummarizeOptions {
        let mut model = ModelParams::new(&config.model);
        model.max_tokens = self.max_tokens;

        let mut options = SummarizeOptions::from_config(&config.summarize, model)
            .verbose(config.verbose);

        if let Some(detail) = self.detail {
            options.detail = detail;
        }
        if let Some(minimum) = self.min_chunk_size {
            options.minimum_chunk_size = minimum;
        }
        if let Some(ref delimiter) = self.delimiter {
            options.chunk_delimiter = delimiter.clone();
        }
        if let Some(ref instructions) = self.instructions {
            options.additional_instructions = Some(instructions.clone());
        }
        if let Some(temperature) = self.temperature {
            options.model.temperature = Some(temperature);
        }
        if self.recursive {
            options.recursive = true;
        }

        options
    }

    fn to_json(
        &self,
        config: &AppConfig,
        options: &SummarizeOptions,
        summary: &Summary,
    ) -> AppResult<serde_json::Value> {
        Ok(serde_json::json!({
            "summary": summary.text,
            "units": summary.units,
            "model": options.model.model,
            "provider": config.provider,
            "detail": options.detail,
            "recursive": options.recursive,
            "plan": serde_json::to_value(summary.plan)?,
            "chunkTokenCounts": summary.chunk_token_counts,
            "usage": {
                "promptTokens": summary.usage.prompt_tokens,
                "completionTokens": summary.usage.completion_tokens,
                "totalTokens": summary.usage.total_tokens
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use precis_core::SummarizeConfig;

    fn command() -> SummarizeCommand {
        SummarizeCommand {
            input: None,
            detail: None,
            min_chunk_size: None,
            delimiter: None,
            recursive: false,
            instructions: None,
            temperature: None,
            max_tokens: None,
            prompts: None,
            json: false,
        }
    }

    #[test]
    fn test_options_from_config_defaults() {
        let config = AppConfig::default();
        let options = command().options(&config);

        assert_eq!(options.detail, 0.0);
        assert_eq!(options.minimum_chunk_size, 500);
        assert_eq!(options.chunk_delimiter, ".");
        assert_eq!(options.model.model, "llama3.2");
        assert_eq!(options.model.temperature, Some(0.0));
        assert!(!options.recursive);
    }

    #[test]
    fn test_flags_override_config() {
        let config = AppConfig {
            verbose: true,
            summarize: SummarizeConfig {
                detail: 0.2,
                recursive: false,
                ..SummarizeConfig::default()
            },
            ..AppConfig::default()
        };

        let cmd = SummarizeCommand {
            detail: Some(0.7),
            min_chunk_size: Some(120),
            delimiter: Some("\n".to_string()),
            recursive: true,
            instructions: Some("Be brief.".to_string()),
            temperature: Some(0.5),
            max_tokens: Some(256),
            ..command()
        };
        let options = cmd.options(&config);

        assert_eq!(options.detail, 0.7);
        assert_eq!(options.minimum_chunk_size, 120);
        assert_eq!(options.chunk_delimiter, "\n");
        assert!(options.recursive);
        assert!(options.verbose);
        assert_eq!(options.additional_instructions.as_deref(), Some("Be brief."));
        assert_eq!(options.model.temperature, Some(0.5));
        assert_eq!(options.model.max_tokens, Some(256));
    }

    #[tokio::test]
    async fn test_execute_with_mock_provider() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Alpha beta gamma. Delta epsilon.").unwrap();

        let config = AppConfig {
            provider: "mock".to_string(),
            tokenizer: "chars".to_string(),
            ..AppConfig::default()
        };
        let cmd = SummarizeCommand {
            input: Some(file.path().to_path_buf()),
            json: true,
            ..command()
        };

        cmd.execute(&config).await.unwrap();
    }
}
