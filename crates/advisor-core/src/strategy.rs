use async_trait::async_trait;

use crate::budget::{Budget, BudgetError, FittedConversation, HistoryBudgeter, SharedTokenCounter};
use crate::conversation::Conversation;

/// Per-endpoint chat policy: how to enrich the user message and how to trim history.
#[async_trait]
pub trait ChatStrategy: Send + Sync {
    /// Return the text to send as the user turn. Must not fail; degrade to `message`.
    async fn augment(&self, message: &str) -> String;

    fn trim(
        &self,
        conversation: Conversation,
        budget: &Budget,
    ) -> Result<FittedConversation, BudgetError>;
}

/// Strategy without augmentation: the message goes through as-is.
#[derive(Clone)]
pub struct TrimOnlyStrategy {
    budgeter: HistoryBudgeter,
    counter: SharedTokenCounter,
}

impl TrimOnlyStrategy {
    pub fn new(budgeter: HistoryBudgeter, counter: SharedTokenCounter) -> Self {
        Self { budgeter, counter }
    }
}

#[async_trait]
impl ChatStrategy for TrimOnlyStrategy {
    async fn augment(&self, message: &str) -> String {
        message.to_string()
    }

    fn trim(
        &self,
        conversation: Conversation,
        budget: &Budget,
    ) -> Result<FittedConversation, BudgetError> {
        self.budgeter
            .fit(conversation, budget, self.counter.as_ref())
    }
}
