pub mod provider;
pub mod providers;

pub use provider::{format_results, Result, SearchError, SearchProvider, SearchResult};
pub use providers::SerpApiProvider;
