pub mod types;

pub use types::{Conversation, Role, Turn};
