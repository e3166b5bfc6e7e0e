//! Service configuration.
//!
//! Tunables come from an optional YAML file; every field has a default so an
//! empty or partial file is valid. Credentials come from the environment
//! (after `.env` is loaded) and are never read from the YAML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use advisor_core::ModelLimit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_AWS_REGION: &str = "us-east-1";
pub const DEFAULT_S3_BUCKET: &str = "llm-customer-uploads";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// What to do when pinned turns alone exceed the prompt budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetOverflow {
    /// Refuse the request with 413.
    #[default]
    Reject,
    /// Log a warning and send the pinned remainder anyway.
    Proceed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f64,
    pub max_completion_tokens: u32,
    /// Context window override; `None` looks the model up in the limits registry.
    pub max_total_tokens: Option<u32>,
    pub per_turn_overhead: u32,
    pub budget_overflow: BudgetOverflow,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_completion_tokens: 2048,
            max_total_tokens: None,
            per_turn_overhead: advisor_core::budget::types::DEFAULT_PER_TURN_OVERHEAD,
            budget_overflow: BudgetOverflow::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub keywords: Vec<String>,
    pub num_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            keywords: ["latest", "news", "today", "current", "price", "weather"]
                .into_iter()
                .map(String::from)
                .collect(),
            num_results: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendSettings {
    pub model: String,
    pub temperature: f64,
    pub max_products: usize,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.4,
            max_products: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
        }
    }
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub max_file_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: 25 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chat: ChatSettings,
    pub search: SearchSettings,
    pub recommend: RecommendSettings,
    pub http: HttpSettings,
    pub upload: UploadSettings,
    pub model_limits: Vec<ModelLimit>,
}

impl Settings {
    /// Defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &content)
    }

    fn from_yaml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Secrets and endpoints from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_region: String,
    pub s3_bucket: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            serpapi_api_key: get("SERPAPI_API_KEY"),
            aws_access_key_id: get("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
            aws_region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            s3_bucket: get("S3_BUCKET_NAME").unwrap_or_else(|| DEFAULT_S3_BUCKET.to_string()),
        }
    }
}
