use serde::Serialize;

use crate::config::GenerationConfig;

/// One chat-completion call: a system message, a user message and sampling
/// settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Role instruction, sent as the system message.
    pub system: String,
    /// Task prompt, sent as the user message.
    pub user: String,
}

/// Per-pipeline settings applied to every agent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
}

impl GenerationSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: GenerationConfig::DEFAULT_MAX_TOKENS,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::new(GenerationConfig::DEFAULT_MODEL)
    }
}

impl From<&GenerationConfig> for GenerationSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }
}
