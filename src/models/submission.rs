//! Form submissions as they arrive and after validation.

use bytes::Bytes;
use serde::Deserialize;

/// An image file received in the `travel_image` field.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Filename supplied by the client, unmodified.
    pub filename: String,

    /// MIME type declared by the client. Never sniffed from the bytes.
    pub content_type: String,

    /// Number of bytes received.
    pub size: u64,

    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }
}

/// State of the file field after the body has been read.
#[derive(Debug, Clone, Default)]
pub enum FileField {
    #[default]
    Missing,
    Received(ImageUpload),
}

/// Raw form fields, exactly as read from the request.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub memory: Option<String>,
    pub image: FileField,
}

impl RawSubmission {
    /// Store a text field by its form name. Unknown names are ignored.
    pub fn set_text(&mut self, field: &str, value: String) {
        let slot = match field {
            "name" => &mut self.name,
            "email" => &mut self.email,
            "location" => &mut self.location,
            "memory" => &mut self.memory,
            _ => return,
        };
        *slot = Some(value);
    }
}

/// Text fields of a urlencoded form. Such a body never carries the file.
#[derive(Debug, Default, Deserialize)]
pub struct TextFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub memory: Option<String>,
}

impl From<TextFields> for RawSubmission {
    fn from(fields: TextFields) -> Self {
        Self {
            name: fields.name,
            email: fields.email,
            location: fields.location,
            memory: fields.memory,
            image: FileField::Missing,
        }
    }
}

/// A submission that passed every validation check.
/// Text fields are trimmed.
#[derive(Debug, Clone)]
pub struct SubmissionInput {
    pub name: String,
    pub email: String,
    pub location: String,
    pub memory: String,
    pub image: ImageUpload,
}
