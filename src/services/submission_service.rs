//! SubmissionService — validate, upload, record, in that order.
//!
//! Each step runs only if the previous one succeeded. A database failure after
//! a successful upload leaves the object in place; nothing is compensated.

use crate::{
    errors::SubmissionError,
    models::{
        record::SubmissionRecord, stored_image::StoredImage,
        submission::{RawSubmission, SubmissionInput},
    },
    services::{
        object_store::ObjectStore,
        record_store::{RecordStore, RecordStoreResult},
        uploader::ImageUploader,
        validator,
    },
};
use std::sync::Arc;
use tracing::{error, info};

/// Everything produced by a successful submission.
#[derive(Debug)]
pub struct Submitted {
    pub input: SubmissionInput,
    pub image: StoredImage,
    pub record: SubmissionRecord,
}

#[derive(Clone)]
pub struct SubmissionService {
    uploader: ImageUploader,
    records: RecordStore,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn ObjectStore>, records: RecordStore) -> Self {
        Self {
            uploader: ImageUploader::new(store),
            records,
        }
    }

    pub fn object_store(&self) -> &Arc<dyn ObjectStore> {
        self.uploader.store()
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub async fn submit(&self, raw: RawSubmission) -> Result<Submitted, SubmissionError> {
        let input = validator::validate(raw)?;

        let image = self.uploader.upload(&input.image).await?;

        let record = self
            .store_record(&input, &image)
            .await
            .map_err(|err| {
                error!(
                    key = %image.key,
                    error = %err,
                    "record write failed after upload; object left in store"
                );
                SubmissionError::DatabaseError(err.to_string())
            })?;

        info!(
            id = record.id,
            key = %image.key,
            location = %input.location,
            "submission stored"
        );

        Ok(Submitted {
            input,
            image,
            record,
        })
    }

    async fn store_record(
        &self,
        input: &SubmissionInput,
        image: &StoredImage,
    ) -> RecordStoreResult<SubmissionRecord> {
        self.records.ensure_table().await?;
        self.records.insert(input, image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::submission::{FileField, ImageUpload},
        test_support::RecordingObjectStore,
    };
    use bytes::Bytes;

    const BASE_URL: &str = "https://travel.s3.us-east-1.amazonaws.com";

    async fn records() -> RecordStore {
        RecordStore::connect("sqlite::memory:", "travel_memories")
            .await
            .unwrap()
    }

    fn submission(email: &str, content_type: &str) -> RawSubmission {
        RawSubmission {
            name: Some("Alice".into()),
            email: Some(email.into()),
            location: Some("Kyoto".into()),
            memory: Some("Cherry blossoms".into()),
            image: FileField::Received(ImageUpload::new(
                "kyoto.jpg",
                content_type,
                Bytes::from(vec![0xFF; 200 * 1024]),
            )),
        }
    }

    async fn row_count(records: &RecordStore) -> i64 {
        records.ensure_table().await.unwrap();
        sqlx::query_scalar("SELECT COUNT(*) FROM travel_memories")
            .fetch_one(records.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn happy_path_uploads_then_records() {
        let store = Arc::new(RecordingObjectStore::new(BASE_URL));
        let records = records().await;
        let service = SubmissionService::new(store.clone(), records.clone());

        let done = service
            .submit(submission("alice@example.com", "image/jpeg"))
            .await
            .unwrap();

        let puts = store.puts();
        assert_eq!(puts.len(), 1);
        assert!(puts[0].key.starts_with("images/travel_"));
        assert!(puts[0].key.ends_with(".jpg"));
        assert_eq!(puts[0].size, 200 * 1024);

        assert_eq!(done.image.url, format!("{}/{}", BASE_URL, puts[0].key));
        assert_eq!(done.record.image_url, done.image.url);
        assert_eq!(done.record.name, "Alice");
        assert_eq!(done.record.location, "Kyoto");

        let row: (String, String, String, String, String) = sqlx::query_as(
            "SELECT name, email, location, memory, image_url FROM travel_memories",
        )
        .fetch_one(records.pool())
        .await
        .unwrap();
        assert_eq!(
            row,
            (
                "Alice".to_string(),
                "alice@example.com".to_string(),
                "Kyoto".to_string(),
                "Cherry blossoms".to_string(),
                done.image.url.clone(),
            )
        );
    }

    #[tokio::test]
    async fn invalid_input_touches_neither_store() {
        let store = Arc::new(RecordingObjectStore::new(BASE_URL));
        let records = records().await;
        let service = SubmissionService::new(store.clone(), records.clone());

        let err = service
            .submit(submission("not-an-email", "image/jpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidEmail));

        let err = service
            .submit(submission("alice@example.com", "application/pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::UnsupportedType(_)));

        assert!(store.puts().is_empty());
        assert_eq!(row_count(&records).await, 0);
    }

    #[tokio::test]
    async fn storage_failure_skips_the_database() {
        let store = Arc::new(RecordingObjectStore::failing("dispatch failure: connection refused"));
        let records = records().await;
        let service = SubmissionService::new(store.clone(), records.clone());

        let err = service
            .submit(submission("alice@example.com", "image/jpeg"))
            .await
            .unwrap_err();
        match err {
            SubmissionError::StorageError(message) => {
                assert!(message.contains("connection refused"))
            }
            other => panic!("expected StorageError, got {:?}", other),
        }
        assert_eq!(store.puts().len(), 1);
        assert_eq!(row_count(&records).await, 0);
    }

    #[tokio::test]
    async fn database_failure_leaves_uploaded_object_behind() {
        let store = Arc::new(RecordingObjectStore::new(BASE_URL));
        let records = records().await;
        records.pool().close().await;
        let service = SubmissionService::new(store.clone(), records);

        let err = service
            .submit(submission("alice@example.com", "image/jpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::DatabaseError(_)));
        assert_eq!(store.puts().len(), 1);
    }
}
