use std::path::Path;
use std::sync::Arc;

use advisor_core::{counter_for_model, Budget, ChatStrategy, HistoryBudgeter, ModelLimitsRegistry};
use advisor_llm::{CompletionProvider, OpenAIProvider};
use advisor_search::{SearchProvider, SerpApiProvider};
use advisor_storage::{BlobStore, ObjectBlobStore, S3Config};

use crate::config::{Credentials, Settings};
use crate::error::{AppError, Result};
use crate::services::search_strategy::SearchAugmentedStrategy;

/// Process-wide state, built once at startup and shared read-only.
///
/// Clients whose credentials are missing stay `None`; the endpoints that need
/// them answer with a configuration error instead of failing at startup.
pub struct AppState {
    pub settings: Settings,
    pub chat_budget: Budget,
    completion: Option<Arc<dyn CompletionProvider>>,
    search: Option<Arc<dyn SearchProvider>>,
    storage: Option<Arc<dyn BlobStore>>,
    strategy: Arc<dyn ChatStrategy>,
}

impl AppState {
    /// State with no clients attached.
    pub fn new(settings: Settings) -> Result<Self> {
        let chat = &settings.chat;
        let chat_budget = match chat.max_total_tokens {
            Some(max_total_tokens) => Budget::new(max_total_tokens, chat.max_completion_tokens),
            None => ModelLimitsRegistry::with_limits(settings.model_limits.clone())
                .budget_for(&chat.model, chat.max_completion_tokens),
        };
        let max_prompt_tokens = chat_budget.max_prompt_tokens()?;
        log::info!(
            "Chat budget for {}: {} prompt tokens ({} reserved for completion)",
            chat.model,
            max_prompt_tokens,
            chat_budget.reserved_completion_tokens
        );

        let strategy = build_strategy(&settings, None);

        Ok(Self {
            settings,
            chat_budget,
            completion: None,
            search: None,
            storage: None,
            strategy,
        })
    }

    /// Wire real clients from environment credentials.
    ///
    /// `storage_dir` selects the local filesystem backend instead of S3.
    pub fn from_credentials(
        settings: Settings,
        credentials: &Credentials,
        storage_dir: Option<&Path>,
    ) -> Result<Self> {
        let timeout = settings.http.request_timeout();
        let mut state = Self::new(settings)?;

        match &credentials.openai_api_key {
            Some(api_key) => {
                let mut provider = OpenAIProvider::new(api_key.clone())
                    .with_model(state.settings.chat.model.clone())
                    .with_timeout(timeout);
                if let Some(base_url) = &credentials.openai_base_url {
                    provider = provider.with_base_url(base_url.clone());
                }
                log::info!("Completion client ready (model {})", provider.default_model());
                state = state.with_completion(Arc::new(provider));
            }
            None => log::warn!(
                "OPENAI_API_KEY not set; chat and recommendation endpoints will fail"
            ),
        }

        match &credentials.serpapi_api_key {
            Some(api_key) => {
                log::info!("Search client ready");
                state = state
                    .with_search(Arc::new(SerpApiProvider::new(api_key.clone()).with_timeout(timeout)));
            }
            None => log::warn!("SERPAPI_API_KEY not set; chat runs without search augmentation"),
        }

        if let Some(dir) = storage_dir {
            let store = ObjectBlobStore::local(dir)?;
            log::info!("Blob storage: {}", store.label());
            state = state.with_storage(Arc::new(store));
        } else if credentials.aws_access_key_id.is_some()
            && credentials.aws_secret_access_key.is_some()
        {
            let config = S3Config {
                bucket: credentials.s3_bucket.clone(),
                region: credentials.aws_region.clone(),
                access_key_id: credentials.aws_access_key_id.clone(),
                secret_access_key: credentials.aws_secret_access_key.clone(),
                timeout,
            };
            match ObjectBlobStore::s3(&config) {
                Ok(store) => {
                    log::info!("Blob storage: {}", store.label());
                    state = state.with_storage(Arc::new(store));
                }
                Err(e) => log::warn!("Failed to initialize S3 client: {}", e),
            }
        } else {
            log::warn!("AWS credentials not set; upload endpoints will fail");
        }

        Ok(state)
    }

    pub fn with_completion(mut self, completion: Arc<dyn CompletionProvider>) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Attaching a search client also switches the chat strategy to augmenting.
    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.strategy = build_strategy(&self.settings, Some(search.clone()));
        self.search = Some(search);
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn BlobStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn completion(&self) -> Result<&Arc<dyn CompletionProvider>> {
        self.completion.as_ref().ok_or_else(|| {
            AppError::Config(
                "OpenAI client not initialized. Please check your OPENAI_API_KEY environment variable."
                    .to_string(),
            )
        })
    }

    pub fn search(&self) -> Result<&Arc<dyn SearchProvider>> {
        self.search.as_ref().ok_or_else(|| {
            AppError::Config(
                "Search client not initialized. Please check your SERPAPI_API_KEY environment variable."
                    .to_string(),
            )
        })
    }

    pub fn storage(&self) -> Result<&Arc<dyn BlobStore>> {
        self.storage.as_ref().ok_or_else(|| {
            AppError::Config(
                "S3 client not initialized. Please check your AWS credentials.".to_string(),
            )
        })
    }

    pub fn strategy(&self) -> &Arc<dyn ChatStrategy> {
        &self.strategy
    }
}

fn build_strategy(
    settings: &Settings,
    search: Option<Arc<dyn SearchProvider>>,
) -> Arc<dyn ChatStrategy> {
    Arc::new(SearchAugmentedStrategy::new(
        &settings.search.keywords,
        search,
        settings.search.num_results,
        HistoryBudgeter::new(settings.chat.per_turn_overhead),
        counter_for_model(&settings.chat.model),
    ))
}
