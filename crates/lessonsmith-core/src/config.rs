use std::env;

/// Connection settings for the chat-completion backend.
///
/// Reads `OPENAI_API_KEY`, `LESSONSMITH_MODEL` and `LESSONSMITH_API_BASE`,
/// falling back to the compile-time defaults when unset.
#[derive(Clone)]
pub struct GenerationConfig {
    /// Bearer token for the backend. `None` means every call fails with
    /// [`crate::client::ServiceError::MissingApiKey`].
    pub api_key: Option<String>,
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Output-length cap per call.
    pub max_tokens: u32,
}

impl GenerationConfig {
    pub const DEFAULT_MODEL: &str = "gpt-4";
    pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
    pub const DEFAULT_MAX_TOKENS: u32 = 4000;

    pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
    pub const MODEL_ENV: &str = "LESSONSMITH_MODEL";
    pub const API_BASE_ENV: &str = "LESSONSMITH_API_BASE";

    /// Build a config from the environment.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var(Self::API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            api_base: env::var(Self::API_BASE_ENV)
                .unwrap_or_else(|_| Self::DEFAULT_API_BASE.to_owned()),
            model: env::var(Self::MODEL_ENV).unwrap_or_else(|_| Self::DEFAULT_MODEL.to_owned()),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    /// Build a config with an explicit key and the default endpoint/model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            api_base: Self::DEFAULT_API_BASE.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

// The API key never appears in logs or debug output.
impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
