use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use advisor_core::{BudgetError, CatalogError};
use advisor_llm::LLMError;
use advisor_search::SearchError;
use advisor_storage::StorageError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    /// A capability whose credentials were missing at startup.
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Conversation exceeds the token budget: {0}")]
    BudgetExceeded(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::Config(_) => "configuration_error",
            AppError::Upstream(_) => "upstream_error",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "invalid_request_error",
            AppError::BudgetExceeded(_) => "context_length_exceeded",
            AppError::Internal(_) => "api_error",
        }
    }
}

#[derive(Serialize)]
struct JsonError {
    message: String,
    r#type: String,
}

#[derive(Serialize)]
struct JsonErrorWrapper {
    error: JsonError,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BudgetExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_response = JsonErrorWrapper {
            error: JsonError {
                message: self.to_string(),
                r#type: self.error_type().to_string(),
            },
        };
        HttpResponse::build(self.status_code()).json(error_response)
    }
}

impl From<LLMError> for AppError {
    fn from(err: LLMError) -> Self {
        AppError::Upstream(format!("Error with OpenAI API: {err}"))
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError::Upstream(format!("Google Search error: {err}"))
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Object not found: {key}")),
            StorageError::InvalidKey { .. } => AppError::BadRequest(err.to_string()),
            StorageError::Store(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::BudgetExceeded { .. } => AppError::BudgetExceeded(err.to_string()),
            BudgetError::InvalidBudget { .. } => AppError::Config(err.to_string()),
            BudgetError::TokenCount(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Csv(_) => AppError::Internal(err.to_string()),
            CatalogError::MissingBase | CatalogError::NoIndustries => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}
