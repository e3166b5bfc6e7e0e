//! OpenAI chat completions request/response shapes.
//!
//! Only `role` and `content` leave the process; the `pinned` flag is internal.

use advisor_core::Turn;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::provider::{LLMError, Result};

/// Convert turns to an OpenAI-compatible `messages` array.
pub fn turns_to_openai_json(turns: &[Turn]) -> Vec<Value> {
    turns
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role.as_str(),
                "content": turn.content,
            })
        })
        .collect()
}

/// Build a non-streaming chat completion request body.
pub fn build_chat_body(
    model: &str,
    turns: &[Turn],
    temperature: Option<f64>,
    max_completion_tokens: Option<u32>,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": turns_to_openai_json(turns),
        "stream": false,
    });

    if let Some(temperature) = temperature {
        body["temperature"] = json!(temperature);
    }

    if let Some(max_tokens) = max_completion_tokens {
        body["max_tokens"] = json!(max_tokens);
    }

    body
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extract the first choice's text from a response body.
pub fn parse_completion(body: &str) -> Result<String> {
    let response: ChatCompletionResponse = serde_json::from_str(body)?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LLMError::EmptyResponse)?;

    if let Some(reason) = choice.finish_reason.as_deref() {
        if reason == "length" {
            log::warn!("Completion stopped at the max_tokens limit");
        }
    }

    choice.message.content.ok_or(LLMError::EmptyResponse)
}

/// Best-effort human-readable message from an error response body.
pub fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
