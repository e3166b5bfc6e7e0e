pub mod budget;
pub mod catalog;
pub mod conversation;
pub mod strategy;
pub mod trigger;

pub use budget::{
    counter_for_model, Budget, BudgetError, FitStatus, FittedConversation, HeuristicTokenCounter,
    HistoryBudgeter, ModelLimit, ModelLimitsRegistry, SharedTokenCounter, TiktokenCounter,
    TokenCounter, TokenUsage,
};
pub use catalog::{Catalog, CatalogError, CsvTable, ProductQuery};
pub use conversation::{Conversation, Role, Turn};
pub use strategy::{ChatStrategy, TrimOnlyStrategy};
pub use trigger::KeywordTrigger;
