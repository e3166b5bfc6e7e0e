//! History trimming under a token budget.
//!
//! Evicts the oldest non-pinned turns until the prompt fits, never touching
//! pinned turns (system prompt, the current user message).

use crate::budget::counter::TokenCounter;
use crate::budget::types::{
    Budget, BudgetError, FitStatus, FittedConversation, TokenUsage, DEFAULT_PER_TURN_OVERHEAD,
};
use crate::conversation::Conversation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryBudgeter {
    per_turn_overhead: u32,
}

impl HistoryBudgeter {
    pub fn new(per_turn_overhead: u32) -> Self {
        Self { per_turn_overhead }
    }

    /// Fit `conversation` into `budget`.
    ///
    /// 1. Cost every turn once
    /// 2. Walk turns oldest-first, evicting non-pinned ones while over budget
    /// 3. Report `BudgetExceeded` when only pinned turns remain and they still don't fit
    ///
    /// Fails only when the budget itself is invalid.
    pub fn fit(
        &self,
        conversation: Conversation,
        budget: &Budget,
        counter: &dyn TokenCounter,
    ) -> Result<FittedConversation, BudgetError> {
        let budget_limit = budget.max_prompt_tokens()?;
        let limit = u64::from(budget_limit);

        let costs: Vec<u64> = conversation
            .iter()
            .map(|turn| self.turn_cost(counter.count_turn(turn)))
            .collect();
        let mut total: u64 = costs.iter().sum();

        let mut evicted = vec![false; costs.len()];
        let mut evicted_turns = 0;
        for (idx, turn) in conversation.iter().enumerate() {
            if total <= limit {
                break;
            }
            if turn.pinned {
                continue;
            }
            evicted[idx] = true;
            evicted_turns += 1;
            total -= costs[idx];
        }

        let status = if total <= limit {
            FitStatus::WithinBudget
        } else {
            log::warn!(
                "Pinned turns ({} tokens) exceed prompt budget ({} tokens)",
                total,
                budget_limit
            );
            FitStatus::BudgetExceeded
        };

        if evicted_turns > 0 {
            log::debug!(
                "Evicted {} of {} turns to fit {} token prompt budget",
                evicted_turns,
                costs.len(),
                budget_limit
            );
        }

        let conversation = if evicted_turns == 0 {
            conversation
        } else {
            conversation
                .into_iter()
                .zip(evicted)
                .filter_map(|(turn, evicted)| (!evicted).then_some(turn))
                .collect()
        };

        Ok(FittedConversation {
            conversation,
            token_usage: TokenUsage {
                total_tokens: saturate(total),
                budget_limit,
            },
            evicted_turns,
            status,
        })
    }

    fn turn_cost(&self, content_tokens: u32) -> u64 {
        u64::from(content_tokens) + u64::from(self.per_turn_overhead)
    }
}

impl Default for HistoryBudgeter {
    fn default() -> Self {
        Self::new(DEFAULT_PER_TURN_OVERHEAD)
    }
}

fn saturate(tokens: u64) -> u32 {
    u32::try_from(tokens).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::counter::HeuristicTokenCounter;
    use crate::conversation::Turn;

    /// Every non-empty turn costs exactly `tokens`.
    struct FixedCounter {
        tokens: u32,
    }

    impl TokenCounter for FixedCounter {
        fn count_text(&self, text: &str) -> u32 {
            if text.is_empty() {
                0
            } else {
                self.tokens
            }
        }
    }

    /// One token per character, so tests can size turns precisely.
    struct CharCounter;

    impl TokenCounter for CharCounter {
        fn count_text(&self, text: &str) -> u32 {
            text.chars().count() as u32
        }
    }

    fn contents(fitted: &FittedConversation) -> Vec<&str> {
        fitted
            .conversation
            .iter()
            .map(|turn| turn.content.as_str())
            .collect()
    }

    #[test]
    fn returns_conversation_unchanged_when_within_budget() {
        let budgeter = HistoryBudgeter::default();
        let counter = HeuristicTokenCounter::default();
        let budget = Budget::new(8_192, 2_048);
        let conversation = Conversation::from_turns(vec![
            Turn::system("You are helpful").pinned(),
            Turn::user("Hello"),
            Turn::assistant("Hi there"),
            Turn::user("How are you?").pinned(),
        ]);

        let fitted = budgeter.fit(conversation.clone(), &budget, &counter).unwrap();

        assert_eq!(fitted.conversation, conversation);
        assert_eq!(fitted.evicted_turns, 0);
        assert!(fitted.is_within_budget());
        assert!(!fitted.truncation_occurred());
    }

    #[test]
    fn evicts_oldest_non_pinned_first() {
        let budgeter = HistoryBudgeter::new(0);
        let counter = FixedCounter { tokens: 10 };
        let budget = Budget::new(25, 0);
        let conversation = Conversation::from_turns(vec![
            Turn::system("A").pinned(),
            Turn::user("B"),
            Turn::assistant("C"),
            Turn::user("D"),
        ]);

        let fitted = budgeter.fit(conversation, &budget, &counter).unwrap();

        assert_eq!(contents(&fitted), vec!["A", "D"]);
        assert_eq!(fitted.evicted_turns, 2);
        assert_eq!(fitted.token_usage.total_tokens, 20);
        assert!(fitted.is_within_budget());
    }

    #[test]
    fn skips_pinned_turns_in_the_middle() {
        let budgeter = HistoryBudgeter::new(0);
        let counter = FixedCounter { tokens: 10 };
        let budget = Budget::new(30, 0);
        let conversation = Conversation::from_turns(vec![
            Turn::user("old"),
            Turn::system("rules").pinned(),
            Turn::assistant("middle"),
            Turn::user("recent"),
            Turn::user("current").pinned(),
        ]);

        let fitted = budgeter.fit(conversation, &budget, &counter).unwrap();

        assert_eq!(contents(&fitted), vec!["rules", "recent", "current"]);
    }

    #[test]
    fn never_evicts_newer_turn_while_older_remains() {
        let budgeter = HistoryBudgeter::new(0);
        let budget = Budget::new(12, 0);
        // A big old turn and a small newer one: FIFO still evicts the old one first,
        // and stops as soon as the budget is met.
        let conversation = Conversation::from_turns(vec![
            Turn::user("aaaaaaaaaa"),
            Turn::assistant("bb"),
            Turn::user("cccccccccc").pinned(),
        ]);

        let fitted = budgeter.fit(conversation, &budget, &CharCounter).unwrap();

        assert_eq!(contents(&fitted), vec!["bb", "cccccccccc"]);
        assert_eq!(fitted.token_usage.total_tokens, 12);
    }

    #[test]
    fn charges_per_turn_overhead() {
        let budgeter = HistoryBudgeter::new(4);
        let counter = FixedCounter { tokens: 10 };
        let conversation = Conversation::from_turns(vec![Turn::user("a"), Turn::user("b")]);

        let within = budgeter
            .fit(conversation.clone(), &Budget::new(28, 0), &counter)
            .unwrap();
        assert_eq!(within.token_usage.total_tokens, 28);
        assert_eq!(within.evicted_turns, 0);

        // 28 > 20: the older turn has to go even though content alone (20) would fit
        let fitted = budgeter
            .fit(conversation, &Budget::new(20, 0), &counter)
            .unwrap();
        assert_eq!(contents(&fitted), vec!["b"]);
        assert_eq!(fitted.token_usage.total_tokens, 14);
    }

    #[test]
    fn reports_budget_exceeded_when_only_pinned_remain() {
        let budgeter = HistoryBudgeter::new(0);
        let counter = FixedCounter { tokens: 100 };
        let budget = Budget::new(50, 0);
        let conversation = Conversation::from_turns(vec![Turn::user("huge").pinned()]);

        let fitted = budgeter.fit(conversation, &budget, &counter).unwrap();

        assert_eq!(fitted.status, FitStatus::BudgetExceeded);
        assert_eq!(contents(&fitted), vec!["huge"]);
        assert_eq!(
            fitted.ensure_within_budget(),
            Err(BudgetError::BudgetExceeded {
                total_tokens: 100,
                budget_limit: 50
            })
        );
    }

    #[test]
    fn exhaustion_returns_pinned_only_remainder() {
        let budgeter = HistoryBudgeter::new(0);
        let counter = FixedCounter { tokens: 30 };
        let budget = Budget::new(50, 0);
        let conversation = Conversation::from_turns(vec![
            Turn::system("sys").pinned(),
            Turn::user("one"),
            Turn::assistant("two"),
            Turn::user("now").pinned(),
        ]);

        let fitted = budgeter.fit(conversation, &budget, &counter).unwrap();

        assert_eq!(fitted.status, FitStatus::BudgetExceeded);
        assert!(fitted.conversation.iter().all(|turn| turn.pinned));
        assert_eq!(contents(&fitted), vec!["sys", "now"]);
        assert_eq!(fitted.evicted_turns, 2);
    }

    #[test]
    fn fit_is_idempotent() {
        let budgeter = HistoryBudgeter::default();
        let counter = HeuristicTokenCounter::default();
        let budget = Budget::new(200, 100);
        let mut turns = vec![Turn::system("System prompt").pinned()];
        for i in 0..30 {
            turns.push(Turn::user(format!("Question number {} with some words", i)));
            turns.push(Turn::assistant(format!("Answer number {} with more words", i)));
        }
        turns.push(Turn::user("Latest question").pinned());

        let once = budgeter
            .fit(Conversation::from_turns(turns), &budget, &counter)
            .unwrap();
        let twice = budgeter
            .fit(once.conversation.clone(), &budget, &counter)
            .unwrap();

        assert_eq!(once.conversation, twice.conversation);
        assert_eq!(twice.evicted_turns, 0);
        assert!(once.token_usage.total_tokens <= once.token_usage.budget_limit);
    }

    #[test]
    fn pinned_turns_always_survive() {
        let budgeter = HistoryBudgeter::default();
        let counter = HeuristicTokenCounter::default();
        let conversation = Conversation::from_turns(vec![
            Turn::system("Pinned system prompt").pinned(),
            Turn::user("a".repeat(400)),
            Turn::assistant("b".repeat(400)),
            Turn::system("Pinned reminder").pinned(),
            Turn::user("c".repeat(400)),
            Turn::user("current").pinned(),
        ]);
        let pinned_before: Vec<Turn> = conversation.iter().filter(|t| t.pinned).cloned().collect();

        for limit in [0u32, 10, 50, 150, 500] {
            let fitted = budgeter
                .fit(conversation.clone(), &Budget::new(limit, 0), &counter)
                .unwrap();
            let pinned_after: Vec<Turn> = fitted
                .conversation
                .iter()
                .filter(|t| t.pinned)
                .cloned()
                .collect();
            assert_eq!(pinned_before, pinned_after, "limit {}", limit);
        }
    }

    #[test]
    fn invalid_budget_is_an_error() {
        let budgeter = HistoryBudgeter::default();
        let counter = HeuristicTokenCounter::default();
        let conversation = Conversation::from_turns(vec![Turn::user("hi").pinned()]);

        let result = budgeter.fit(conversation, &Budget::new(100, 200), &counter);

        assert!(matches!(result, Err(BudgetError::InvalidBudget { .. })));
    }

    #[test]
    fn handles_empty_conversation() {
        let budgeter = HistoryBudgeter::default();
        let counter = HeuristicTokenCounter::default();

        let fitted = budgeter
            .fit(Conversation::new(), &Budget::new(100, 50), &counter)
            .unwrap();

        assert!(fitted.conversation.is_empty());
        assert_eq!(fitted.token_usage.total_tokens, 0);
        assert!(fitted.is_within_budget());
    }
}
