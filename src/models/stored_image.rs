//! An image after it has been written to the object store.

/// Reference to an uploaded image. The object store owns the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Object key, e.g. `images/travel_1718000000_<token>.jpg`.
    pub key: String,

    /// Publicly resolvable URL for the key.
    pub url: String,

    pub content_type: String,
}

impl StoredImage {
    /// Last path segment of the key, recorded as `image_filename`.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}
