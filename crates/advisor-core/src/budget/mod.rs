//! Token budget management for chat requests.
//!
//! Trims conversation history so that the prompt sent to the completion API
//! fits within the model's context window after reserving room for the answer.
//!
//! # Key Components
//!
//! - [`types`]: `Budget`, `FittedConversation`, `BudgetError`
//! - [`counter`]: Token counting (tiktoken when the model is known, heuristic otherwise)
//! - [`budgeter`]: FIFO eviction of non-pinned turns
//! - [`limits`]: Model context window limits registry

pub mod budgeter;
pub mod counter;
pub mod limits;
pub mod types;

pub use budgeter::HistoryBudgeter;
pub use counter::{
    counter_for_model, HeuristicTokenCounter, SharedTokenCounter, TiktokenCounter, TokenCounter,
};
pub use limits::{ModelLimit, ModelLimitsRegistry};
pub use types::{Budget, BudgetError, FitStatus, FittedConversation, TokenUsage};
