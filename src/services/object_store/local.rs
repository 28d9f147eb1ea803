//! Local-disk backend.
//!
//! Objects live at `base_path/{key}`; the declared content type is kept in a
//! `{key}.content-type` sidecar so `GET /objects/{*key}` can replay it.

use super::{ObjectStore, ObjectStoreError, ObjectStoreResult, join_url};
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::{debug, info};
use uuid::Uuid;

const MAX_OBJECT_KEY_LEN: usize = 1024;
const CONTENT_TYPE_SUFFIX: &str = ".content-type";

#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalObjectStore {
    /// Open (and create if needed) a store rooted at `base_path`.
    /// `base_url` is the public prefix under which keys are served.
    pub async fn open(
        base_path: impl Into<PathBuf>,
        base_url: impl Into<String>,
    ) -> ObjectStoreResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;
        Ok(Self {
            base_path,
            base_url: base_url.into(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Rejects keys that could escape `base_path` or collide with sidecars.
    fn ensure_key_safe(key: &str) -> ObjectStoreResult<()> {
        let invalid = key.is_empty()
            || key.len() > MAX_OBJECT_KEY_LEN
            || key.starts_with('/')
            || key.ends_with('/')
            || key.contains("..")
            || key.ends_with(CONTENT_TYPE_SUFFIX)
            || key
                .bytes()
                .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0');
        if invalid {
            return Err(ObjectStoreError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    fn object_path(&self, key: &str) -> ObjectStoreResult<PathBuf> {
        Self::ensure_key_safe(key)?;
        Ok(self.base_path.join(key))
    }

    fn content_type_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(CONTENT_TYPE_SUFFIX);
        PathBuf::from(name)
    }

    /// Open a stored object for streaming, with its recorded content type and size.
    pub async fn open_object(&self, key: &str) -> ObjectStoreResult<(File, Option<String>, u64)> {
        let path = self.object_path(key)?;
        let file = File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                ObjectStoreError::NotFound(key.to_string())
            } else {
                ObjectStoreError::Io(err)
            }
        })?;
        let size = file.metadata().await?.len();
        let content_type = match fs::read_to_string(Self::content_type_path(&path)).await {
            Ok(value) => Some(value),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(ObjectStoreError::Io(err)),
        };
        Ok((file, content_type, size))
    }

    /// Write `body` to a temp file next to `path`, fsync, then rename into place.
    async fn write_atomically(path: &Path, body: &[u8]) -> io::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| io::Error::new(ErrorKind::Other, "object path missing parent"))?;
        fs::create_dir_all(parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));

        let result = async {
            let mut file = File::create(&tmp_path).await?;
            file.write_all(body).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, path).await
        }
        .await;

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path).await;
        }
        result
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> ObjectStoreResult<String> {
        let path = self.object_path(key)?;
        Self::write_atomically(&path, &body).await?;
        fs::write(Self::content_type_path(&path), content_type).await?;

        info!(
            path = %path.display(),
            key = %key,
            size_bytes = body.len(),
            "Local object stored"
        );

        Ok(join_url(&self.base_url, key))
    }

    /// Write, read back and delete a scratch file under `base_path`.
    async fn probe(&self) -> ObjectStoreResult<()> {
        let tmp_path = self.base_path.join(format!(".readyz-{}", Uuid::new_v4()));
        fs::write(&tmp_path, b"readyz").await?;
        let bytes = fs::read(&tmp_path).await;
        if let Err(err) = fs::remove_file(&tmp_path).await {
            debug!("could not remove probe file {}: {}", tmp_path.display(), err);
        }
        if bytes? != b"readyz" {
            return Err(ObjectStoreError::Backend("probe file content mismatch".into()));
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
