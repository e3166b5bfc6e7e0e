use std::sync::Arc;

use advisor_core::{
    Budget, BudgetError, ChatStrategy, Conversation, FittedConversation, HistoryBudgeter,
    KeywordTrigger, SharedTokenCounter, TrimOnlyStrategy,
};
use advisor_search::{format_results, SearchProvider};
use async_trait::async_trait;

pub const SEARCH_RESULTS_HEADER: &str = "\n\nRelevant web search results:\n";

/// Appends web-search snippets to messages that hit a configured keyword.
///
/// Without a search client (or with no keywords) it behaves like
/// [`TrimOnlyStrategy`]. Search failures are logged and the message goes
/// through unchanged.
pub struct SearchAugmentedStrategy {
    trigger: KeywordTrigger,
    search: Option<Arc<dyn SearchProvider>>,
    num_results: usize,
    inner: TrimOnlyStrategy,
}

impl SearchAugmentedStrategy {
    pub fn new<S: AsRef<str>>(
        keywords: &[S],
        search: Option<Arc<dyn SearchProvider>>,
        num_results: usize,
        budgeter: HistoryBudgeter,
        counter: SharedTokenCounter,
    ) -> Self {
        Self {
            trigger: KeywordTrigger::new(keywords),
            search,
            num_results,
            inner: TrimOnlyStrategy::new(budgeter, counter),
        }
    }
}

#[async_trait]
impl ChatStrategy for SearchAugmentedStrategy {
    async fn augment(&self, message: &str) -> String {
        let Some(search) = &self.search else {
            return message.to_string();
        };
        if self.num_results == 0 || !self.trigger.needs_augmentation(message) {
            return message.to_string();
        }

        match search.search(message, self.num_results).await {
            Ok(results) if results.is_empty() => {
                log::debug!("Search returned nothing; sending message as-is");
                message.to_string()
            }
            Ok(results) => {
                log::info!("Augmenting message with {} search results", results.len());
                format!("{}{}{}", message, SEARCH_RESULTS_HEADER, format_results(&results))
            }
            Err(e) => {
                log::warn!("Search failed, continuing without augmentation: {}", e);
                message.to_string()
            }
        }
    }

    fn trim(
        &self,
        conversation: Conversation,
        budget: &Budget,
    ) -> Result<FittedConversation, BudgetError> {
        self.inner.trim(conversation, budget)
    }
}
