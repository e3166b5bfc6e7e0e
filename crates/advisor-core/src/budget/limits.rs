//! Model context window limits registry.
//!
//! Known context window sizes for common models, with user overrides from
//! configuration taking priority.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::budget::types::Budget;

/// Known model context window sizes.
pub const KNOWN_MODEL_LIMITS: &[(&str, u32)] = &[
    ("gpt-4o", 128_000),
    ("gpt-4o-mini", 128_000),
    ("gpt-4-turbo", 128_000),
    ("gpt-4.1", 1_047_576),
    ("gpt-4.1-mini", 1_047_576),
    ("gpt-4-32k", 32_768),
    ("gpt-4", 8_192),
    ("gpt-3.5-turbo", 16_385),
    // Default fallback
    ("default", 128_000),
];

/// Model limit configuration (user-overridable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLimit {
    /// Model identifier (partial match supported, e.g., "gpt-4" matches "gpt-4-0613")
    pub model_pattern: String,
    /// Maximum context window size in tokens
    pub max_context_tokens: u32,
}

impl ModelLimit {
    pub fn new(model_pattern: impl Into<String>, max_context_tokens: u32) -> Self {
        Self {
            model_pattern: model_pattern.into(),
            max_context_tokens,
        }
    }
}

/// Registry for model limits with built-in defaults and user overrides.
#[derive(Debug, Clone, Default)]
pub struct ModelLimitsRegistry {
    user_limits: HashMap<String, ModelLimit>,
}

impl ModelLimitsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: impl IntoIterator<Item = ModelLimit>) -> Self {
        let mut registry = Self::new();
        for limit in limits {
            registry.add_limit(limit);
        }
        registry
    }

    pub fn add_limit(&mut self, limit: ModelLimit) {
        self.user_limits.insert(limit.model_pattern.clone(), limit);
    }

    /// Get limit for a model, with user overrides taking priority.
    ///
    /// # Matching Strategy
    /// 1. Exact match (user, then built-in)
    /// 2. Model contains pattern or pattern contains model
    ///
    /// For partial matches, the longest (most specific) pattern wins.
    pub fn get(&self, model: &str) -> Option<ModelLimit> {
        if let Some(limit) = self.user_limits.get(model) {
            return Some(limit.clone());
        }

        if let Some((_, tokens)) = KNOWN_MODEL_LIMITS.iter().find(|(p, _)| *p == model) {
            return Some(ModelLimit::new(model, *tokens));
        }

        let best_user_match = self
            .user_limits
            .iter()
            .filter(|(pattern, _)| model.contains(pattern.as_str()) || pattern.contains(model))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, limit)| limit.clone());

        if best_user_match.is_some() {
            return best_user_match;
        }

        KNOWN_MODEL_LIMITS
            .iter()
            .filter(|(pattern, _)| *pattern != "default")
            .filter(|(pattern, _)| model.contains(pattern) || pattern.contains(model))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(pattern, tokens)| ModelLimit::new(*pattern, *tokens))
    }

    /// Get limit for a model with fallback to default.
    pub fn get_or_default(&self, model: &str) -> ModelLimit {
        self.get(model).unwrap_or_else(|| {
            let default = KNOWN_MODEL_LIMITS
                .iter()
                .find(|(k, _)| *k == "default")
                .map(|(_, v)| *v)
                .unwrap_or(128_000);
            ModelLimit::new("default", default)
        })
    }

    /// Budget for `model` reserving `reserved_completion_tokens` for the answer.
    pub fn budget_for(&self, model: &str, reserved_completion_tokens: u32) -> Budget {
        let limit = self.get_or_default(model);
        Budget::new(limit.max_context_tokens, reserved_completion_tokens)
    }
}
