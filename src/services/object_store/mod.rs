//! Object storage abstraction.
//!
//! Uploaded images go through [`ObjectStore`], which hides whether the bytes
//! land in S3 or on local disk. Both backends return a public URL per key.

pub mod local;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use thiserror::Error;
use url::Url;

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("invalid object key `{0}`")]
    InvalidKey(String),
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error("{0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` under `key` with `content_type` as object metadata and
    /// return the publicly resolvable URL. Issued once, never retried.
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> ObjectStoreResult<String>;

    /// Cheap reachability check used by the readiness probe.
    async fn probe(&self) -> ObjectStoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// Append `key` to `base` as path segments, percent-encoding each one.
///
/// Keys carry client-chosen extensions, so `#`, `?`, `%` or spaces must not
/// leak into the URL unencoded. A base that does not parse as a URL is joined
/// as plain text.
pub(crate) fn join_url(base: &str, key: &str) -> String {
    let segments = key.split('/').filter(|segment| !segment.is_empty());
    let mut url = match Url::parse(base) {
        Ok(url) if !url.cannot_be_a_base() => url,
        _ => return format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/')),
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_a_single_slash() {
        assert_eq!(
            join_url("http://127.0.0.1:3000/objects/", "/images/a.png"),
            "http://127.0.0.1:3000/objects/images/a.png"
        );
        assert_eq!(
            join_url("https://cdn.example.com", "images/a.png"),
            "https://cdn.example.com/images/a.png"
        );
    }

    #[test]
    fn key_segments_are_percent_encoded() {
        let url = join_url("https://cdn.example.com/travel", "images/travel_1_abc.jp#g");
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/travel/images/travel_1_abc.jp%23g");
        assert_eq!(parsed.fragment(), None);

        let url = join_url("https://cdn.example.com", "images/my trip?.png");
        assert_eq!(url, "https://cdn.example.com/images/my%20trip%3F.png");
    }
}
