//! Command handlers for the Precis CLI.

pub mod chunk;
pub mod summarize;

pub use chunk::ChunkCommand;
pub use summarize::SummarizeCommand;

use precis_chunk::{create_tokenizer, Tokenizer};
use precis_core::{config::AppConfig, AppError, AppResult};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Read the input document from a file, or from stdin when the path is
/// missing or `-`.
pub fn read_input(path: Option<&Path>) -> AppResult<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            tracing::debug!("Reading input from {:?}", path);
            std::fs::read_to_string(path).map_err(|e| {
                AppError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read {:?}: {}", path, e),
                ))
            })
        }
        _ => {
            tracing::debug!("Reading input from stdin");
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Tokenizer named by the configuration.
pub fn configured_tokenizer(config: &AppConfig) -> AppResult<Arc<dyn Tokenizer>> {
    tracing::debug!("Tokenizer: {}", config.tokenizer);
    create_tokenizer(&config.tokenizer)
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "First. Second.").unwrap();

        let text = read_input(Some(file.path())).unwrap();
        assert_eq!(text, "First. Second.");
    }

    #[test]
    fn test_read_input_missing_file() {
        let result = read_input(Some(Path::new("/nonexistent/precis-input.txt")));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_configured_tokenizer_rejects_unknown() {
        let config = AppConfig {
            tokenizer: "nope".to_string(),
            ..AppConfig::default()
        };
        assert!(configured_tokenizer(&config).is_err());
    }
}
