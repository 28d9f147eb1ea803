//! Image upload step: key generation plus one put to the object store.

use crate::{
    errors::SubmissionError,
    models::{stored_image::StoredImage, submission::ImageUpload},
    services::object_store::ObjectStore,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

const KEY_PREFIX: &str = "images/travel_";

/// Extension of `filename` taken verbatim: the text after the last `.` of
/// the final path component, or empty when there is none.
pub fn original_extension(filename: &str) -> &str {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    base.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

/// `images/travel_<unix-timestamp>_<token>.<extension>`.
///
/// The token is a random v4 UUID in simple form, so keys generated within the
/// same second never repeat.
pub fn generate_object_key(original_filename: &str, timestamp: i64) -> String {
    format!(
        "{}{}_{}.{}",
        KEY_PREFIX,
        timestamp,
        Uuid::new_v4().simple(),
        original_extension(original_filename)
    )
}

/// Stores validated images in the configured object store.
#[derive(Clone)]
pub struct ImageUploader {
    store: Arc<dyn ObjectStore>,
}

impl ImageUploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Put the image under a fresh key and resolve its public URL.
    pub async fn upload(&self, image: &ImageUpload) -> Result<StoredImage, SubmissionError> {
        let key = generate_object_key(&image.filename, Utc::now().timestamp());
        debug!(
            key = %key,
            content_type = %image.content_type,
            size_bytes = image.size,
            backend = self.store.backend_name(),
            "uploading image"
        );

        let url = self
            .store
            .put_object(&key, image.bytes.clone(), &image.content_type)
            .await
            .map_err(|err| {
                error!(key = %key, error = %err, "image upload failed");
                SubmissionError::StorageError(err.to_string())
            })?;

        Ok(StoredImage {
            key,
            url,
            content_type: image.content_type.clone(),
        })
    }
}
