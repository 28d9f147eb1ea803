use crate::render;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// Every way a submission can fail. The first failure ends the request.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("All fields are required: `{0}` is empty")]
    MissingField(&'static str),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Error uploading file: {0}")]
    UploadError(String),

    #[error("Only image files (JPG, PNG, GIF) are allowed, got `{0}`")]
    UnsupportedType(String),

    #[error("File size must be less than 5MB ({size} bytes received)")]
    FileTooLarge { size: u64 },

    #[error("{0}")]
    StorageError(String),

    #[error("{0}")]
    DatabaseError(String),
}

impl SubmissionError {
    /// Caused by the client rather than an external service.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::StorageError(_) | Self::DatabaseError(_))
    }

    /// Error domain shown in front of the detail message.
    pub fn category(&self) -> &'static str {
        match self {
            Self::StorageError(_) => "Storage Error",
            Self::DatabaseError(_) => "Database Error",
            _ => "Error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::InvalidEmail | Self::UploadError(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::StorageError(_) => StatusCode::BAD_GATEWAY,
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        if self.is_validation() {
            tracing::warn!(error = %self, "submission rejected");
        } else {
            tracing::error!(category = self.category(), error = %self, "submission failed");
        }
        let body = render::error_message(self.category(), &self.to_string());
        (self.status(), Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infrastructure_errors_name_their_domain() {
        let err = SubmissionError::StorageError("AccessDenied".into());
        assert_eq!(err.category(), "Storage Error");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(!err.is_validation());

        let err = SubmissionError::DatabaseError("connection refused".into());
        assert_eq!(err.category(), "Database Error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_errors_are_client_errors() {
        let errors = [
            SubmissionError::MissingField("name"),
            SubmissionError::InvalidEmail,
            SubmissionError::UploadError("truncated".into()),
            SubmissionError::UnsupportedType("application/pdf".into()),
            SubmissionError::FileTooLarge { size: 6_000_000 },
        ];
        for err in errors {
            assert!(err.is_validation());
            assert!(err.status().is_client_error(), "{:?}", err);
            assert_eq!(err.category(), "Error");
        }
    }
}
