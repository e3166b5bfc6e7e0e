pub mod chat_service;
pub mod recommendation_service;
pub mod search_strategy;

pub use chat_service::{run_chat, ChatReply};
pub use search_strategy::SearchAugmentedStrategy;
