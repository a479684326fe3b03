//! Precis CLI
//!
//! Main entry point for the precis command-line tool.
//! Summarizes long documents at a controllable level of detail.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ChunkCommand, SummarizeCommand};
use precis_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Precis - detail-controlled summarization of long documents
#[derive(Parser, Debug)]
#[command(name = "precis")]
#[command(about = "Summarize long documents at a controllable level of detail", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "PRECIS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter directive (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log chunk counts and progress (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// LLM provider (openai, ollama, mock)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Provider endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Tokenizer encoding (cl100k_base, o200k_base, bytes, chars)
    #[arg(long, global = true)]
    tokenizer: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize a document
    Summarize(SummarizeCommand),

    /// Show how a document is split into chunks
    Chunk(ChunkCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Config file, then environment
    let config = AppConfig::load(cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.provider,
        cli.model,
        cli.endpoint,
        cli.tokenizer,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Precis CLI starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Summarize(_) => "summarize",
        Commands::Chunk(_) => "chunk",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Only summarizing needs a usable provider
    if matches!(cli.command, Commands::Summarize(_)) {
        config.validate()?;
    }

    let result = match cli.command {
        Commands::Summarize(cmd) => cmd.execute(&config).await,
        Commands::Chunk(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
