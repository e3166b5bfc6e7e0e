//! Google results through SerpAPI's `search.json` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::provider::{null_as_default, Result, SearchError, SearchProvider, SearchResult};

const DEFAULT_BASE_URL: &str = "https://serpapi.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SerpApiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    organic_results: Vec<SearchResult>,
    #[serde(default)]
    error: Option<String>,
}

impl SerpApiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>> {
        let num = num_results.to_string();
        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("num", num.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<SerpApiResponse>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| text.trim().to_string());
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SerpApiResponse = serde_json::from_str(&text)?;
        if let Some(error) = body.error {
            // SerpAPI reports "no results" as a 200 with an error field
            log::debug!("SerpAPI returned no results for '{}': {}", query, error);
        }

        let mut results = body.organic_results;
        results.truncate(num_results);
        log::debug!("Search for '{}' returned {} results", query, results.len());
        Ok(results)
    }
}
