use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpResponse};
use advisor_storage::{customer_prefix, prompt_key, upload_key};

use crate::error::{AppError, Result};
use crate::multipart::FormData;
use crate::state::AppState;

/// Files are stored one by one; a failure leaves earlier files in place.
#[post("/files/")]
pub async fn upload_files(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let storage = state.storage()?;

    let form = FormData::read(payload, state.settings.upload.max_file_bytes).await?;
    let customer_id = form.required_text("customer_id")?.to_string();

    let mut uploads = Vec::new();
    for file in form.into_files("files") {
        if file.file_name.trim().is_empty() {
            continue;
        }
        uploads.push((upload_key(&customer_id, &file.file_name)?, file));
    }
    if uploads.is_empty() {
        return Err(AppError::BadRequest("No files provided".to_string()));
    }

    let mut uploaded_files = Vec::with_capacity(uploads.len());
    for (key, file) in uploads {
        storage.put(&key, file.data).await.map_err(|e| {
            log::error!("Failed to store {}: {}", key, e);
            AppError::Internal(format!("Error uploading {}: {}", file.file_name, e))
        })?;
        uploaded_files.push(key);
    }
    log::info!(
        "Uploaded {} files for customer {}",
        uploaded_files.len(),
        customer_id
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Files uploaded successfully",
        "customer_id": customer_id,
        "uploaded_files": uploaded_files,
    })))
}

#[post("/prompt/")]
pub async fn upload_prompt(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let storage = state.storage()?;

    let form = FormData::read(payload, state.settings.upload.max_file_bytes).await?;
    let customer_id = form.required_text("customer_id")?.to_string();
    let prompt = form
        .into_files("prompt_file")
        .into_iter()
        .next()
        .ok_or_else(|| AppError::BadRequest("Missing form field: prompt_file".to_string()))?;

    if !prompt.file_name.ends_with(".txt") {
        return Err(AppError::BadRequest(
            "Only text files with .txt extension are allowed for prompts".to_string(),
        ));
    }

    let key = prompt_key(&customer_id)?;
    storage.put(&key, prompt.data).await?;
    log::info!("Stored prompt for customer {}", customer_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Prompt file uploaded successfully",
        "customer_id": customer_id,
        "file_path": key,
    })))
}

#[get("/files/{customer_id}")]
pub async fn list_files(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let customer_id = path.into_inner();
    let storage = state.storage()?;

    let files = storage.list(&customer_prefix(&customer_id)?).await?;
    let message = if files.is_empty() {
        format!("No files found for customer: {customer_id}")
    } else {
        format!("Files for customer: {customer_id}")
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": message,
        "files": files,
    })))
}

#[delete("/files/{customer_id}/{file_name}")]
pub async fn delete_file(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (customer_id, file) = path.into_inner();
    let storage = state.storage()?;

    let key = upload_key(&customer_id, &file)?;
    if !storage.exists(&key).await? {
        return Err(AppError::NotFound(format!(
            "File not found: {file} for customer: {customer_id}"
        )));
    }
    storage.delete(&key).await?;
    log::info!("Deleted {}", key);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "File deleted successfully",
        "customer_id": customer_id,
        "deleted_file": key,
    })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/upload")
            .service(upload_files)
            .service(upload_prompt)
            .service(list_files)
            .service(delete_file),
    );
}
