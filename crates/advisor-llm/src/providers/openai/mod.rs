use std::time::Duration;

use advisor_core::Turn;
use async_trait::async_trait;
use reqwest::Client;

use crate::protocol::openai::{build_chat_body, parse_completion, parse_error_message};
use crate::provider::{CompletionOptions, CompletionProvider, LLMError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(&self, turns: &[Turn], options: &CompletionOptions) -> Result<String> {
        let model = options.model.as_deref().unwrap_or(&self.model);
        let body = build_chat_body(
            model,
            turns,
            options.temperature,
            options.max_completion_tokens,
        );

        log::debug!(
            "Requesting completion: model={}, turns={}",
            model,
            turns.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LLMError::Api {
                status: status.as_u16(),
                message: parse_error_message(&text),
            });
        }

        parse_completion(&text)
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
