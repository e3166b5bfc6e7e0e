use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpResponse};
use advisor_core::catalog::file_name;
use advisor_core::Turn;
use advisor_search::format_results;
use advisor_storage::{chat_file_key, chat_files_prefix};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::multipart::FormData;
use crate::services::chat_service::{describe_uploads, parse_history_field};
use crate::services::run_chat;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub uploaded_files: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
struct ChatFile {
    full_path: String,
    filename: String,
}

#[post("/")]
pub async fn chat(
    state: web::Data<AppState>,
    payload: web::Json<ChatRequest>,
) -> Result<HttpResponse> {
    let request = payload.into_inner();
    let reply = run_chat(&state, request.history, &request.message).await?;

    log::debug!(
        "Chat reply ready ({} prompt tokens, {} turns evicted)",
        reply.prompt_tokens,
        reply.evicted_turns
    );

    Ok(HttpResponse::Ok().json(ChatResponse {
        response: reply.response,
        uploaded_files: None,
    }))
}

#[post("/with-files")]
pub async fn chat_with_files(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse> {
    state.completion()?;
    let storage = state.storage()?;

    let form = FormData::read(payload, state.settings.upload.max_file_bytes).await?;
    let message = form.required_text("message")?.to_string();
    let customer_id = form.required_text("customer_id")?.to_string();
    let history = parse_history_field(form.text("history"));

    let mut uploads = Vec::new();
    for file in form.into_files("files") {
        if file.file_name.trim().is_empty() {
            continue;
        }
        let key = chat_file_key(&customer_id, &file.file_name)?;
        uploads.push((key, file));
    }

    let mut file_names = Vec::with_capacity(uploads.len());
    let mut uploaded_keys = Vec::with_capacity(uploads.len());
    for (key, file) in uploads {
        storage.put(&key, file.data).await.map_err(|e| {
            log::error!("Failed to store chat file {}: {}", key, e);
            AppError::Internal(format!("Error uploading {}: {}", file.file_name, e))
        })?;
        log::info!("Stored chat file {}", key);
        file_names.push(file.file_name);
        uploaded_keys.push(key);
    }

    let content = describe_uploads(&message, &file_names);
    let reply = run_chat(&state, history, &content).await?;

    Ok(HttpResponse::Ok().json(ChatResponse {
        response: reply.response,
        uploaded_files: Some(uploaded_keys),
    }))
}

#[get("/files/{customer_id}")]
pub async fn list_chat_files(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let customer_id = path.into_inner();
    let storage = state.storage()?;

    let keys = storage.list(&chat_files_prefix(&customer_id)?).await?;
    let message = if keys.is_empty() {
        format!("No chat files found for customer: {customer_id}")
    } else {
        format!("Chat files for customer: {customer_id}")
    };
    let files: Vec<ChatFile> = keys
        .into_iter()
        .map(|key| ChatFile {
            filename: file_name(&key).to_string(),
            full_path: key,
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": message,
        "files": files,
    })))
}

#[delete("/files/{customer_id}/{file_name}")]
pub async fn delete_chat_file(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (customer_id, file) = path.into_inner();
    let storage = state.storage()?;

    let key = chat_file_key(&customer_id, &file)?;
    if !storage.exists(&key).await? {
        return Err(AppError::NotFound(format!(
            "Chat file not found: {file} for customer: {customer_id}"
        )));
    }
    storage.delete(&key).await?;
    log::info!("Deleted chat file {}", key);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Chat file deleted successfully",
        "customer_id": customer_id,
        "deleted_file": key,
    })))
}

#[post("/search")]
pub async fn search(
    state: web::Data<AppState>,
    payload: web::Json<SearchRequest>,
) -> Result<HttpResponse> {
    let search = state.search()?;
    let results = search
        .search(&payload.query, state.settings.search.num_results)
        .await
        .map_err(|e| {
            log::error!("Search for '{}' failed: {}", payload.query, e);
            AppError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "results": format_results(&results),
    })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chat")
            .service(chat)
            .service(chat_with_files)
            .service(list_chat_files)
            .service(delete_chat_file)
            .service(search),
    );
}
