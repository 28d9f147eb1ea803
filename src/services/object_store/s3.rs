//! S3 backend built on `aws-sdk-s3`.

use super::{ObjectStore, ObjectStoreError, ObjectStoreResult, join_url};
use crate::config::StorageSettings;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Region, retry::RetryConfig},
    error::DisplayErrorContext,
    primitives::ByteStream,
};
use bytes::Bytes;
use std::time::Instant;
use tracing::{error, info};

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
    public_base_url: Option<String>,
}

impl S3ObjectStore {
    /// Build a client from the AWS provider chain plus explicit settings.
    ///
    /// SDK retries are disabled: a failed put surfaces immediately.
    pub async fn from_settings(settings: &StorageSettings) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&shared).retry_config(RetryConfig::disabled());
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!(
            bucket = %settings.bucket,
            region = %settings.region,
            endpoint = ?settings.endpoint,
            "Initialized S3 object store"
        );

        Self::new(
            Client::from_conf(builder.build()),
            settings.bucket.clone(),
            settings.region.clone(),
            settings.endpoint.clone(),
            settings.public_base_url.clone(),
        )
    }

    pub fn new(
        client: Client,
        bucket: String,
        region: String,
        endpoint: Option<String>,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            client,
            bucket,
            region,
            endpoint,
            public_base_url,
        }
    }

    /// Public URL of `key`.
    ///
    /// An explicit base URL wins, then a custom endpoint (path-style), then the
    /// virtual-hosted AWS form `https://{bucket}.s3.{region}.amazonaws.com/{key}`.
    /// Key segments are percent-encoded in every form.
    pub fn object_url(&self, key: &str) -> String {
        if let Some(base) = &self.public_base_url {
            join_url(base, key)
        } else if let Some(endpoint) = &self.endpoint {
            join_url(&join_url(endpoint, &self.bucket), key)
        } else {
            let host = format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region);
            join_url(&host, key)
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> ObjectStoreResult<String> {
        let size = body.len();
        let start = Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                error!(
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %message,
                    "S3 put failed"
                );
                ObjectStoreError::Backend(message)
            })?;

        info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_millis() as u64,
            "S3 put successful"
        );

        Ok(self.object_url(key))
    }

    async fn probe(&self) -> ObjectStoreResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
