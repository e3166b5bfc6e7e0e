use advisor_core::Turn;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Completion response contained no message content")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// Per-call completion parameters. Unset fields fall back to provider defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_completion_tokens: Option<u32>,
}

impl CompletionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_completion_tokens(mut self, max_completion_tokens: u32) -> Self {
        self.max_completion_tokens = Some(max_completion_tokens);
        self
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Non-streaming chat completion; returns the assistant's reply text.
    ///
    /// # Arguments
    /// * `turns` - Conversation, already trimmed to budget
    /// * `options` - Model override, temperature and completion token cap
    async fn complete(&self, turns: &[Turn], options: &CompletionOptions) -> Result<String>;

    /// Model used when `options.model` is `None`.
    fn default_model(&self) -> &str;
}
