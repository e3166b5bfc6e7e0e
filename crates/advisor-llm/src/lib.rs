pub mod protocol;
pub mod provider;
pub mod providers;

pub use provider::{CompletionOptions, CompletionProvider, LLMError, Result};
pub use providers::OpenAIProvider;
