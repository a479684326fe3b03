//! Loader for YAML prompt template overrides.

use crate::builder::PromptBuilder;
use crate::types::PromptTemplates;
use precis_core::{AppError, AppResult};
use std::path::Path;

/// Load summarization templates from a YAML file.
///
/// Keys that are absent keep their default template.
///
/// # Example
/// ```no_run
/// use precis_prompt::load_templates;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let templates = load_templates(Path::new("prompts.yaml"))?;
/// println!("System: {}", templates.system);
/// # Ok(())
/// # }
/// ```
pub fn load_templates(path: &Path) -> AppResult<PromptTemplates> {
    tracing::debug!("Loading prompt templates from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt template file not found: {:?}",
            path
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt template file {:?}: {}", path, e))
    })?;

    let templates: PromptTemplates = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt template YAML {:?}: {}", path, e))
    })?;

    validate_templates(&templates)?;

    tracing::info!("Loaded prompt templates from {:?}", path);

    Ok(templates)
}

/// Validate templates: non-empty, compilable, and the recursive template
/// must place the chunk somewhere.
pub fn validate_templates(templates: &PromptTemplates) -> AppResult<()> {
    if templates.system.trim().is_empty() {
        return Err(AppError::Prompt("System template is empty".to_string()));
    }

    if !templates.recursive_user.contains("{{chunk}}") {
        return Err(AppError::Prompt(
            "Recursive user template must reference {{chunk}}".to_string(),
        ));
    }

    if !templates.recursive_user.contains("{{previous_summaries}}") {
        tracing::warn!("Recursive user template does not reference {{{{previous_summaries}}}}");
    }

    PromptBuilder::new(templates).map(|_| ())
}
