//! Configuration management for Precis.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`precis.yaml` or the path in `PRECIS_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Config file looked up in the current directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "precis.yaml";

/// Providers the factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 3] = ["openai", "ollama", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider (e.g., "openai", "ollama", "mock")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// Endpoint override for the provider
    pub endpoint: Option<String>,

    /// API key for the provider
    pub api_key: Option<String>,

    /// Tokenizer encoding used for all token counting
    pub tokenizer: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging and chunk diagnostics)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider configurations from the config file
    pub llm: Option<LlmConfig>,

    /// Summarization defaults
    pub summarize: SummarizeConfig,
}

/// LLM configuration from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::OpenAI { model, .. } => model,
            ProviderConfig::Ollama { model, .. } => model,
        }
    }

    /// Endpoint configured for this provider, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Default options for the `summarize` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeConfig {
    /// Detail level in [0, 1]
    #[serde(default)]
    pub detail: f64,

    /// Token floor per chunk
    #[serde(rename = "minimumChunkSize", default = "default_minimum_chunk_size")]
    pub minimum_chunk_size: usize,

    /// Delimiter used to split the document into segments
    #[serde(rename = "chunkDelimiter", default = "default_chunk_delimiter")]
    pub chunk_delimiter: String,

    /// Carry previous summaries forward as context
    #[serde(default)]
    pub recursive: bool,

    /// Extra text appended to the system instruction
    #[serde(rename = "additionalInstructions", default)]
    pub additional_instructions: Option<String>,

    /// Sampling temperature for completions
    #[serde(default)]
    pub temperature: f32,
}

fn default_minimum_chunk_size() -> usize {
    500
}

fn default_chunk_delimiter() -> String {
    ".".to_string()
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            detail: 0.0,
            minimum_chunk_size: default_minimum_chunk_size(),
            chunk_delimiter: default_chunk_delimiter(),
            recursive: false,
            additional_instructions: None,
            temperature: 0.0,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    logging: Option<LoggingConfig>,
    tokenizer: Option<TokenizerConfig>,
    summarize: Option<SummarizeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenizerConfig {
    encoding: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key: None,
            tokenizer: "cl100k_base".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            summarize: SummarizeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `PRECIS_CONFIG`: Path to config file
    /// - `PRECIS_PROVIDER`: Completion provider
    /// - `PRECIS_MODEL`: Model identifier
    /// - `PRECIS_ENDPOINT`: Provider endpoint
    /// - `PRECIS_API_KEY`: API key
    /// - `PRECIS_TOKENIZER`: Tokenizer encoding
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use precis_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Provider: {}", config.provider);
    /// ```
    pub fn load(config_file: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_file.or_else(|| std::env::var("PRECIS_CONFIG").ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Self::from_file(&path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        // Environment variables override the config file
        if let Ok(provider) = std::env::var("PRECIS_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("PRECIS_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("PRECIS_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if let Ok(tokenizer) = std::env::var("PRECIS_TOKENIZER") {
            config.tokenizer = tokenizer;
        }

        config.api_key = std::env::var("PRECIS_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Build a configuration from defaults merged with a YAML config file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let mut config = Self::default().merge_yaml(path)?;
        config.config_file = Some(path.to_path_buf());
        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = if contents.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|e| {
                AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        };

        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(encoding) = config_file.tokenizer.and_then(|t| t.encoding) {
            result.tokenizer = encoding;
        }

        if let Some(summarize) = config_file.summarize {
            result.summarize = summarize;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
                result.endpoint = provider_config.endpoint().map(str::to_string);
            }

            result.llm = Some(llm);
        }

        tracing::debug!("Merged config file {:?}", path);

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        endpoint: Option<String>,
        tokenizer: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            // A provider switch invalidates the endpoint taken from another provider's block
            if provider != self.provider {
                self.endpoint = self
                    .get_provider_config(&provider)
                    .and_then(|pc| pc.endpoint().map(str::to_string));
            }
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(endpoint) = endpoint {
            self.endpoint = Some(endpoint);
        }

        if let Some(tokenizer) = tokenizer {
            self.tokenizer = tokenizer;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the configuration block for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Resolve the API key for a provider.
    ///
    /// `PRECIS_API_KEY` wins; otherwise the provider's `apiKeyEnv` is consulted,
    /// then `OPENAI_API_KEY` for the openai provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.get_provider_config(provider) {
            if let Ok(key) = std::env::var(&api_key_env) {
                return Some(key);
            }
        }

        if provider == "openai" {
            return std::env::var("OPENAI_API_KEY").ok();
        }

        None
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "openai" && self.resolve_api_key(provider).is_none() {
            let env_var = match self.get_provider_config(provider) {
                Some(ProviderConfig::OpenAI { api_key_env, .. }) => api_key_env,
                _ => "OPENAI_API_KEY".to_string(),
            };
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                env_var
            )));
        }

        if self.summarize.minimum_chunk_size == 0 {
            return Err(AppError::Config(
                "summarize.minimumChunkSize must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.tokenizer, "cl100k_base");
        assert_eq!(config.summarize.minimum_chunk_size, 500);
        assert_eq!(config.summarize.chunk_delimiter, ".");
        assert!(!config.summarize.recursive);
        assert!(!config.verbose);
    }

    #[test]
    fn test_from_file_merges_sections() {
        let file = write_config(
            r#"
llm:
  activeProvider: openai
  providers:
    openai:
      apiKeyEnv: MY_OPENAI_KEY
      model: gpt-4-turbo
    ollama:
      endpoint: http://localhost:11434
      model: llama3.2
logging:
  level: warn
  color: false
tokenizer:
  encoding: o200k_base
summarize:
  detail: 0.25
  minimumChunkSize: 300
  chunkDelimiter: "\n"
  recursive: true
  additionalInstructions: Use bullet points.
"#,
        );

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4-turbo");
        assert_eq!(config.endpoint, None);
        assert_eq!(config.log_level, Some("warn".to_string()));
        assert!(config.no_color);
        assert_eq!(config.tokenizer, "o200k_base");
        assert_eq!(config.summarize.detail, 0.25);
        assert_eq!(config.summarize.minimum_chunk_size, 300);
        assert_eq!(config.summarize.chunk_delimiter, "\n");
        assert!(config.summarize.recursive);
        assert_eq!(
            config.summarize.additional_instructions,
            Some("Use bullet points.".to_string())
        );
    }

    #[test]
    fn test_partial_summarize_section_uses_defaults() {
        let file = write_config("summarize:\n  recursive: true\n");
        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(config.summarize.recursive);
        assert_eq!(config.summarize.minimum_chunk_size, 500);
        assert_eq!(config.summarize.chunk_delimiter, ".");
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let file = write_config("");
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.config_file, Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let file = write_config("llm: [unterminated");
        match AppConfig::from_file(file.path()) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Failed to parse")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("openai".to_string()),
            Some("gpt-4".to_string()),
            None,
            Some("o200k_base".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.model, "gpt-4");
        assert_eq!(overridden.tokenizer, "o200k_base");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_provider_override_picks_matching_endpoint() {
        let file = write_config(
            r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: http://gpu-box:11434
      model: llama3.2
"#,
        );
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://gpu-box:11434"));

        let switched = config.with_overrides(
            Some("mock".to_string()),
            None,
            None,
            None,
            None,
            false,
            false,
        );
        assert_eq!(switched.endpoint, None);
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama_and_mock() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());
        config.provider = "mock".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_openai_with_explicit_key() {
        let mut config = AppConfig::default();
        config.provider = "openai".to_string();
        config.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_minimum_chunk_size() {
        let mut config = AppConfig::default();
        config.summarize.minimum_chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
