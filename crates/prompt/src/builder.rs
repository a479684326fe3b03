//! Prompt builder for rendering summarization templates.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptTemplates};
use handlebars::Handlebars;
use precis_core::{AppError, AppResult};
use std::collections::HashMap;

const SYSTEM_TEMPLATE: &str = "system";
const RECURSIVE_USER_TEMPLATE: &str = "recursive_user";

/// Separator between summaries, both in recursive context and in the final output.
pub const SUMMARY_SEPARATOR: &str = "\n\n";

/// Compiled summarization templates.
///
/// Templates are registered once; every chunk then renders against the same
/// registry.
///
/// # Example
/// ```
/// use precis_prompt::{PromptBuilder, PromptTemplates};
///
/// let builder = PromptBuilder::new(&PromptTemplates::default()).unwrap();
/// let prior = vec!["First summary.".to_string()];
/// let built = builder.build(None, &prior, "Next chunk.", true).unwrap();
/// assert!(built.user.starts_with("Previous summaries:"));
/// ```
pub struct PromptBuilder {
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    /// Compile the given templates.
    pub fn new(templates: &PromptTemplates) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(SYSTEM_TEMPLATE, &templates.system)
            .map_err(|e| AppError::Prompt(format!("Failed to register system template: {}", e)))?;
        registry
            .register_template_string(RECURSIVE_USER_TEMPLATE, &templates.recursive_user)
            .map_err(|e| {
                AppError::Prompt(format!("Failed to register recursive user template: {}", e))
            })?;

        Ok(Self { registry })
    }

    /// Render the system instruction.
    ///
    /// `additional_instructions`, when present, is appended after a blank line.
    /// An empty string still appends the separator.
    pub fn system_prompt(&self, additional_instructions: Option<&str>) -> AppResult<String> {
        let mut system = self.render(SYSTEM_TEMPLATE, &HashMap::new())?;

        if let Some(extra) = additional_instructions {
            system.push_str(SUMMARY_SEPARATOR);
            system.push_str(extra);
        }

        Ok(system)
    }

    /// Render the user message for one chunk.
    ///
    /// Returns the chunk verbatim unless `recursive` is set and at least one
    /// earlier summary exists.
    pub fn user_prompt(
        &self,
        prior_summaries: &[String],
        chunk: &str,
        recursive: bool,
    ) -> AppResult<String> {
        if !recursive || prior_summaries.is_empty() {
            return Ok(chunk.to_string());
        }

        let previous = prior_summaries.join(SUMMARY_SEPARATOR);
        let mut variables = HashMap::new();
        variables.insert("previous_summaries", previous.as_str());
        variables.insert("chunk", chunk);

        self.render(RECURSIVE_USER_TEMPLATE, &variables)
    }

    /// Build both messages for one chunk.
    pub fn build(
        &self,
        additional_instructions: Option<&str>,
        prior_summaries: &[String],
        chunk: &str,
        recursive: bool,
    ) -> AppResult<BuiltPrompt> {
        let system = self.system_prompt(additional_instructions)?;
        let user = self.user_prompt(prior_summaries, chunk, recursive)?;
        let recursive_context = recursive && !prior_summaries.is_empty();

        tracing::trace!(
            recursive_context,
            prior = prior_summaries.len(),
            "Built summarization prompt"
        );

        Ok(BuiltPrompt {
            system,
            user,
            metadata: BuiltPromptMetadata {
                recursive_context,
                prior_summary_count: if recursive_context {
                    prior_summaries.len()
                } else {
                    0
                },
            },
        })
    }

    fn render(&self, name: &str, variables: &HashMap<&str, &str>) -> AppResult<String> {
        self.registry
            .render(name, variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template '{}': {}", name, e)))
    }
}
