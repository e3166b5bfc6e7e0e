use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Search API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub snippet: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            link: link.into(),
        }
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Up to `num_results` results, in ranking order.
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>>;
}

/// `title\nsnippet\nlink` blocks separated by a blank line.
pub fn format_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| format!("{}\n{}\n{}", r.title, r.snippet, r.link))
        .collect::<Vec<_>>()
        .join("\n\n")
}
