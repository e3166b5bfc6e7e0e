//! Core types for token budget management.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conversation::Conversation;

/// Default per-turn framing overhead charged by chat models (role, separators).
pub const DEFAULT_PER_TURN_OVERHEAD: u32 = 4;

/// Token budget for a single completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Context window size for the model (prompt + completion)
    pub max_total_tokens: u32,
    /// Tokens reserved for the model's answer
    pub reserved_completion_tokens: u32,
}

impl Budget {
    pub fn new(max_total_tokens: u32, reserved_completion_tokens: u32) -> Self {
        Self {
            max_total_tokens,
            reserved_completion_tokens,
        }
    }

    /// Tokens available for the prompt.
    ///
    /// Fails when the completion reservation is larger than the whole window.
    pub fn max_prompt_tokens(&self) -> Result<u32, BudgetError> {
        self.max_total_tokens
            .checked_sub(self.reserved_completion_tokens)
            .ok_or(BudgetError::InvalidBudget {
                max_total_tokens: self.max_total_tokens,
                reserved_completion_tokens: self.reserved_completion_tokens,
            })
    }
}

/// Prompt size after fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the fitted conversation, overhead included
    pub total_tokens: u32,
    /// Prompt token ceiling
    pub budget_limit: u32,
}

impl TokenUsage {
    /// Calculate percentage of budget used.
    pub fn usage_percentage(&self) -> f64 {
        if self.budget_limit == 0 {
            return 0.0;
        }
        (self.total_tokens as f64 / self.budget_limit as f64) * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStatus {
    WithinBudget,
    /// Only pinned turns remain and they still exceed the ceiling.
    BudgetExceeded,
}

/// Result of fitting a conversation to a budget.
#[derive(Debug, Clone)]
pub struct FittedConversation {
    pub conversation: Conversation,
    pub token_usage: TokenUsage,
    /// Number of turns evicted
    pub evicted_turns: usize,
    pub status: FitStatus,
}

impl FittedConversation {
    pub fn is_within_budget(&self) -> bool {
        self.status == FitStatus::WithinBudget
    }

    pub fn truncation_occurred(&self) -> bool {
        self.evicted_turns > 0
    }

    /// Turn a `BudgetExceeded` status into an error, for callers that abort on overflow.
    pub fn ensure_within_budget(self) -> Result<Conversation, BudgetError> {
        match self.status {
            FitStatus::WithinBudget => Ok(self.conversation),
            FitStatus::BudgetExceeded => Err(BudgetError::BudgetExceeded {
                total_tokens: self.token_usage.total_tokens,
                budget_limit: self.token_usage.budget_limit,
            }),
        }
    }
}

/// Errors that can occur during budget management.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("Invalid budget: {reserved_completion_tokens} completion tokens reserved out of {max_total_tokens} total")]
    InvalidBudget {
        max_total_tokens: u32,
        reserved_completion_tokens: u32,
    },

    #[error("Pinned turns ({total_tokens} tokens) exceed the prompt budget ({budget_limit} tokens)")]
    BudgetExceeded { total_tokens: u32, budget_limit: u32 },

    #[error("Failed to count tokens: {0}")]
    TokenCount(String),
}
