#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use advisor_core::Turn;
use advisor_llm::{CompletionOptions, CompletionProvider, LLMError};
use advisor_server::config::{ChatSettings, Settings};
use advisor_server::AppState;
use advisor_storage::{BlobStore, ObjectBlobStore, StorageError};
use async_trait::async_trait;
use bytes::Bytes;

/// Completion client that records every request and answers with a fixed reply.
pub struct FakeCompletion {
    reply: String,
    fail: bool,
    requests: Mutex<Vec<(Vec<Turn>, CompletionOptions)>>,
}

impl FakeCompletion {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: String::new(),
            fail: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<(Vec<Turn>, CompletionOptions)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_turns(&self) -> Vec<Turn> {
        self.requests().last().map(|(turns, _)| turns.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(
        &self,
        turns: &[Turn],
        options: &CompletionOptions,
    ) -> advisor_llm::Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((turns.to_vec(), options.clone()));
        if self.fail {
            return Err(LLMError::Api {
                status: 429,
                message: "Rate limit reached".to_string(),
            });
        }
        Ok(self.reply.clone())
    }

    fn default_model(&self) -> &str {
        "test-model"
    }
}

/// Small, heuristic-counted budget: 50 prompt tokens, 4 tokens per-turn overhead.
pub fn small_budget_settings() -> Settings {
    Settings {
        chat: ChatSettings {
            model: "test-model".to_string(),
            max_total_tokens: Some(60),
            max_completion_tokens: 10,
            ..ChatSettings::default()
        },
        ..Settings::default()
    }
}

pub fn state_with(
    settings: Settings,
    completion: Arc<FakeCompletion>,
    storage: Arc<ObjectBlobStore>,
) -> AppState {
    AppState::new(settings)
        .unwrap()
        .with_completion(completion)
        .with_storage(storage as Arc<dyn BlobStore>)
}

/// In-memory storage whose `fail_on`-th `put` (1-based) fails.
pub struct FailingPutStorage {
    inner: ObjectBlobStore,
    puts: AtomicUsize,
    fail_on: usize,
}

impl FailingPutStorage {
    pub fn failing_on(fail_on: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: ObjectBlobStore::in_memory(),
            puts: AtomicUsize::new(0),
            fail_on,
        })
    }
}

#[async_trait]
impl BlobStore for FailingPutStorage {
    async fn put(&self, key: &str, data: Bytes) -> advisor_storage::Result<()> {
        let attempt = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == self.fail_on {
            return Err(StorageError::Store(object_store::Error::Generic {
                store: "test",
                source: "bucket unavailable".into(),
            }));
        }
        self.inner.put(key, data).await
    }

    async fn list(&self, prefix: &str) -> advisor_storage::Result<Vec<String>> {
        self.inner.list(prefix).await
    }

    async fn get(&self, key: &str) -> advisor_storage::Result<Bytes> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> advisor_storage::Result<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> advisor_storage::Result<bool> {
        self.inner.exists(key).await
    }
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub const BOUNDARY: &str = "advisor-test-boundary";

/// Returns the content type header value and the encoded body.
pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
