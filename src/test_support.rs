//! Fakes shared by unit and router tests.

use crate::services::object_store::{ObjectStore, ObjectStoreError, ObjectStoreResult, join_url};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

/// In-memory object store that records every put and can be told to fail.
pub struct RecordingObjectStore {
    base_url: String,
    failure: Option<String>,
    puts: Mutex<Vec<RecordedPut>>,
}

impl RecordingObjectStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            failure: None,
            puts: Mutex::new(Vec::new()),
        }
    }

    /// Every put fails with `message` after being recorded as attempted.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new("http://unused")
        }
    }

    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingObjectStore {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> ObjectStoreResult<String> {
        self.puts.lock().unwrap().push(RecordedPut {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size: body.len(),
        });
        match &self.failure {
            Some(message) => Err(ObjectStoreError::Backend(message.clone())),
            None => Ok(join_url(&self.base_url, key)),
        }
    }

    async fn probe(&self) -> ObjectStoreResult<()> {
        match &self.failure {
            Some(message) => Err(ObjectStoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}
