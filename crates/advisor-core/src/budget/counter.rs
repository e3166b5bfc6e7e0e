//! Token counting for budget management.
//!
//! Exact BPE counts via `tiktoken-rs` when the model is known, otherwise a
//! character-based estimate. Both are deterministic.

use std::sync::Arc;

use tiktoken_rs::CoreBPE;

use crate::budget::types::BudgetError;
use crate::conversation::Turn;

/// Trait for token counting implementations.
pub trait TokenCounter: Send + Sync {
    /// Count tokens in a plain text string.
    fn count_text(&self, text: &str) -> u32;

    /// Count content tokens of a single turn (framing overhead excluded).
    fn count_turn(&self, turn: &Turn) -> u32 {
        self.count_text(&turn.content)
    }
}

/// Character-based estimate: `ceil(chars / chars_per_token)`.
#[derive(Debug, Clone)]
pub struct HeuristicTokenCounter {
    chars_per_token: usize,
}

impl HeuristicTokenCounter {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for HeuristicTokenCounter {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TokenCounter for HeuristicTokenCounter {
    fn count_text(&self, text: &str) -> u32 {
        let chars = text.chars().count();
        u32::try_from(chars.div_ceil(self.chars_per_token)).unwrap_or(u32::MAX)
    }
}

/// Exact token counter backed by the model's BPE tokenizer.
#[derive(Clone)]
pub struct TiktokenCounter {
    model: String,
    bpe: Arc<CoreBPE>,
}

impl TiktokenCounter {
    /// Load the tokenizer for `model`. Fails for models tiktoken does not know.
    pub fn for_model(model: &str) -> Result<Self, BudgetError> {
        let bpe = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|e| BudgetError::TokenCount(format!("no tokenizer for '{}': {}", model, e)))?;
        Ok(Self {
            model: model.to_string(),
            bpe: Arc::new(bpe),
        })
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("model", &self.model)
            .finish()
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_text(&self, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }
        let tokens = self.bpe.encode_with_special_tokens(text).len();
        u32::try_from(tokens).unwrap_or(u32::MAX)
    }
}

/// Arc-wrapped token counter for easy sharing.
pub type SharedTokenCounter = Arc<dyn TokenCounter>;

/// Pick the best available counter for `model`.
///
/// Unknown models degrade to the heuristic counter instead of failing the request.
pub fn counter_for_model(model: &str) -> SharedTokenCounter {
    match TiktokenCounter::for_model(model) {
        Ok(counter) => Arc::new(counter),
        Err(e) => {
            log::warn!("{}; falling back to heuristic token counting", e);
            Arc::new(HeuristicTokenCounter::default())
        }
    }
}
