//! `GET /objects/{*key}` — serves images stored by the local backend.

use crate::{services::object_store::ObjectStoreError, state::AppState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::error;

/// Stream a stored object with its recorded content type.
pub async fn get_object(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let Some(store) = state.local_objects.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let (file, content_type, size) = match store.open_object(&key).await {
        Ok(found) => found,
        Err(ObjectStoreError::NotFound(_) | ObjectStoreError::InvalidKey(_)) => {
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(err) => {
            error!(key = %key, error = %err, "failed to open stored object");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        content_type
            .as_deref()
            .and_then(|value| HeaderValue::from_str(value).ok())
            .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    response
}
