//! Prompt types for summarization.

use serde::{Deserialize, Serialize};

/// Default system instruction for every chunk.
pub const DEFAULT_SYSTEM_TEMPLATE: &str = "Rewrite this text in summarized form.";

/// Default user message when earlier summaries are carried forward.
pub const DEFAULT_RECURSIVE_USER_TEMPLATE: &str =
    "Previous summaries:\n\n{{previous_summaries}}\n\nText to summarize next:\n\n{{chunk}}";

/// Handlebars templates used to build summarization prompts.
///
/// Can be loaded from YAML; missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplates {
    /// System instruction template
    pub system: String,

    /// User message template for recursive mode. Receives `previous_summaries`
    /// (prior outputs joined by a blank line) and `chunk`.
    #[serde(rename = "recursiveUser")]
    pub recursive_user: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_TEMPLATE.to_string(),
            recursive_user: DEFAULT_RECURSIVE_USER_TEMPLATE.to_string(),
        }
    }
}

/// A fully built prompt ready for one completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message
    pub system: String,

    /// User message
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Whether earlier summaries were embedded in the user message
    #[serde(rename = "recursiveContext")]
    pub recursive_context: bool,

    /// Number of earlier summaries embedded
    #[serde(rename = "priorSummaryCount")]
    pub prior_summary_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_deserialization_with_defaults() {
        let yaml = r#"
system: "Summarize the following legal text."
"#;

        let templates: PromptTemplates = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(templates.system, "Summarize the following legal text.");
        assert_eq!(templates.recursive_user, DEFAULT_RECURSIVE_USER_TEMPLATE);
    }

    #[test]
    fn test_recursive_user_key() {
        let yaml = "recursiveUser: \"Context: {{previous_summaries}} Next: {{chunk}}\"\n";
        let templates: PromptTemplates = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(templates.system, DEFAULT_SYSTEM_TEMPLATE);
        assert!(templates.recursive_user.starts_with("Context:"));
    }
}
