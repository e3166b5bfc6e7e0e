use advisor_core::catalog::{build_prompt, industry_names, is_csv_key, DEFAULT_RECOMMENDATION_PROMPT};
use advisor_core::{Catalog, CsvTable, ProductQuery, Turn};
use advisor_llm::CompletionOptions;
use advisor_storage::{customer_prefix, prompt_key, BlobStore, StorageError};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Recommendation {
    pub message: String,
    #[serde(rename = "availableIndustries")]
    pub available_industries: Vec<String>,
    #[serde(rename = "matchedProducts")]
    pub matched_products: usize,
    /// Parsed JSON when the model answered with JSON, the raw text otherwise.
    #[serde(rename = "gptResponse")]
    pub gpt_response: Value,
}

/// CSV keys under the customer's folder, with 404s for an empty folder.
async fn list_csv_keys(storage: &dyn BlobStore, customer_id: &str) -> Result<Vec<String>> {
    let keys = storage.list(&customer_prefix(customer_id)?).await?;
    if keys.is_empty() {
        return Err(AppError::NotFound(format!(
            "No files found for customer_id: {customer_id}"
        )));
    }

    let csv_keys: Vec<String> = keys.into_iter().filter(|key| is_csv_key(key)).collect();
    if csv_keys.is_empty() {
        return Err(AppError::NotFound(format!(
            "No CSV files found for customer_id: {customer_id}"
        )));
    }
    Ok(csv_keys)
}

async fn load_catalog(storage: &dyn BlobStore, keys: Vec<String>) -> Result<Catalog> {
    let mut tables = Vec::with_capacity(keys.len());
    for key in keys {
        let data = storage.get(&key).await?;
        let table = CsvTable::from_bytes(&data)
            .map_err(|e| AppError::BadRequest(format!("Failed to read {key}: {e}")))?;
        tables.push((key, table));
    }
    Ok(Catalog::assemble(tables)?)
}

async fn load_prompt(storage: &dyn BlobStore, customer_id: &str) -> Result<String> {
    match storage.get(&prompt_key(customer_id)?).await {
        Ok(data) => Ok(String::from_utf8_lossy(&data).into_owned()),
        Err(StorageError::NotFound(_)) => Ok(DEFAULT_RECOMMENDATION_PROMPT.to_string()),
        Err(e) => {
            log::warn!("Failed to read prompt for {}, using default: {}", customer_id, e);
            Ok(DEFAULT_RECOMMENDATION_PROMPT.to_string())
        }
    }
}

pub async fn list_industries(state: &AppState, customer_id: &str) -> Result<Vec<String>> {
    let storage = state.storage()?;
    let keys = list_csv_keys(storage.as_ref(), customer_id).await?;
    Ok(industry_names(keys.iter().map(String::as_str)))
}

pub async fn recommend(
    state: &AppState,
    customer_id: &str,
    products: &[ProductQuery],
) -> Result<Recommendation> {
    let max_products = state.settings.recommend.max_products;
    if products.is_empty() || products.len() > max_products {
        return Err(AppError::BadRequest(format!(
            "Between 1 and {} products are required, got {}",
            max_products,
            products.len()
        )));
    }

    let completion = state.completion()?;
    let storage = state.storage()?.as_ref();

    let keys = list_csv_keys(storage, customer_id).await?;
    let catalog = load_catalog(storage, keys).await?;
    let available_industries = catalog.available_industries();
    log::debug!("Available industries for {}: {:?}", customer_id, available_industries);

    let missing = catalog.missing_industries(products);
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Some requested industries are not available: {}. Available industries: {}",
            missing.join(", "),
            available_industries.join(", ")
        )));
    }

    let examples = catalog.render_examples(products);
    if examples.is_empty() {
        return Err(AppError::BadRequest(
            "Could not match any products with base and industry data. Please check product names and industries."
                .to_string(),
        ));
    }

    let base_prompt = load_prompt(storage, customer_id).await?;
    let prompt = build_prompt(&base_prompt, &examples);

    let settings = &state.settings.recommend;
    let options = CompletionOptions::new()
        .with_model(settings.model.clone())
        .with_temperature(settings.temperature);
    let text = completion
        .complete(&[Turn::user(prompt).pinned()], &options)
        .await
        .map_err(|e| {
            log::error!("Recommendation completion failed for {}: {}", customer_id, e);
            AppError::from(e)
        })?;

    log::info!(
        "Generated recommendations for {} ({} products matched)",
        customer_id,
        examples.len()
    );

    Ok(Recommendation {
        message: "Processed successfully".to_string(),
        available_industries,
        matched_products: examples.len(),
        gpt_response: parse_model_answer(text),
    })
}

fn parse_model_answer(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}
