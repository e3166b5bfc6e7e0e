//! The single chat pipeline shared by the text and file-upload endpoints.
//!
//! augment -> append pinned user turn -> trim to budget -> complete

use advisor_core::{Conversation, Turn};
use advisor_llm::CompletionOptions;

use crate::config::BudgetOverflow;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub prompt_tokens: u32,
    pub evicted_turns: usize,
}

/// Run one chat exchange. `history` is the caller's prior turns; it is
/// consumed, never written back.
pub async fn run_chat(state: &AppState, history: Vec<Turn>, message: &str) -> Result<ChatReply> {
    let completion = state.completion()?;
    let strategy = state.strategy();

    let content = strategy.augment(message).await;
    let mut conversation = Conversation::from_turns(history).pin_system_turns();
    conversation.push(Turn::user(content).pinned());

    let fitted = strategy.trim(conversation, &state.chat_budget)?;
    let usage = fitted.token_usage;
    let evicted_turns = fitted.evicted_turns;
    if fitted.truncation_occurred() {
        log::debug!(
            "Evicted {} history turns, prompt at {:.1}% of budget",
            evicted_turns,
            usage.usage_percentage()
        );
    }
    let chat = &state.settings.chat;

    let conversation = match chat.budget_overflow {
        BudgetOverflow::Reject => fitted.ensure_within_budget()?,
        BudgetOverflow::Proceed => {
            if !fitted.is_within_budget() {
                log::warn!(
                    "Sending {} tokens over a {} token prompt budget",
                    usage.total_tokens,
                    usage.budget_limit
                );
            }
            fitted.conversation
        }
    };

    let options = CompletionOptions::new()
        .with_model(chat.model.clone())
        .with_temperature(chat.temperature)
        .with_max_completion_tokens(chat.max_completion_tokens);

    let response = completion
        .complete(conversation.turns(), &options)
        .await
        .map_err(|e| {
            log::error!("Completion request failed: {}", e);
            AppError::from(e)
        })?;

    Ok(ChatReply {
        response,
        prompt_tokens: usage.total_tokens,
        evicted_turns,
    })
}

/// Append the attachment list to the user's message.
pub fn describe_uploads(message: &str, file_names: &[String]) -> String {
    if file_names.is_empty() {
        return message.to_string();
    }
    let references: Vec<String> = file_names
        .iter()
        .map(|name| format!("File uploaded: {name}"))
        .collect();
    format!("{}\n\nFiles uploaded:\n{}", message, references.join("\n"))
}

/// Parse the JSON history form field; anything unparsable is an empty history.
pub fn parse_history_field(raw: Option<&str>) -> Vec<Turn> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(turns) => turns,
        Err(e) => {
            log::debug!("Ignoring invalid history field: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::Role;

    #[test]
    fn describe_uploads_lists_each_file() {
        let text = describe_uploads("See attached", &["a.csv".into(), "b.pdf".into()]);
        assert_eq!(
            text,
            "See attached\n\nFiles uploaded:\nFile uploaded: a.csv\nFile uploaded: b.pdf"
        );
        assert_eq!(describe_uploads("plain", &[]), "plain");
    }

    #[test]
    fn history_field_falls_back_to_empty() {
        assert!(parse_history_field(None).is_empty());
        assert!(parse_history_field(Some("not json")).is_empty());
        assert!(parse_history_field(Some(r#"{"role":"user"}"#)).is_empty());

        let turns = parse_history_field(Some(
            r#"[{"role":"system","content":"be brief"},{"role":"user","content":"hi"}]"#,
        ));
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::System);
    }
}
