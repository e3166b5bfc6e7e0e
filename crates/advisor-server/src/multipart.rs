//! Buffered `multipart/form-data` parsing for the upload endpoints.

use actix_multipart::{Field, Multipart};
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub data: Bytes,
}

/// Text fields and file parts of one form, in arrival order.
#[derive(Debug, Default)]
pub struct FormData {
    texts: Vec<(String, String)>,
    files: Vec<UploadedFile>,
}

impl FormData {
    /// Read the whole form, failing on any file part larger than `max_file_bytes`.
    pub async fn read(mut payload: Multipart, max_file_bytes: usize) -> Result<Self> {
        let mut form = FormData::default();

        while let Some(field) = payload.try_next().await.map_err(bad_multipart)? {
            let disposition = field.content_disposition().cloned();
            let name = disposition
                .as_ref()
                .and_then(|cd| cd.get_name())
                .unwrap_or_default()
                .to_string();
            let file_name = disposition
                .as_ref()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);

            match file_name {
                Some(file_name) => {
                    let data = read_field(field, max_file_bytes, &file_name).await?;
                    form.files.push(UploadedFile {
                        field: name,
                        file_name,
                        data,
                    });
                }
                None => {
                    let data = read_field(field, max_file_bytes, &name).await?;
                    let text = String::from_utf8(data.to_vec()).map_err(|_| {
                        AppError::BadRequest(format!("Form field '{name}' is not valid UTF-8"))
                    })?;
                    form.texts.push((name, text));
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn required_text(&self, name: &str) -> Result<&str> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("Missing form field: {name}")))
    }

    pub fn into_files(self, field: &str) -> Vec<UploadedFile> {
        self.files
            .into_iter()
            .filter(|file| file.field == field)
            .collect()
    }
}

async fn read_field(mut field: Field, max_bytes: usize, label: &str) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        if buf.len() + chunk.len() > max_bytes {
            return Err(AppError::BadRequest(format!(
                "'{label}' exceeds the upload limit of {max_bytes} bytes"
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

fn bad_multipart(err: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {err}"))
}
