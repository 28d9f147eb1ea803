//! `POST /submit` — the travel memory form endpoint.

use crate::{
    errors::SubmissionError,
    models::submission::{FileField, ImageUpload, RawSubmission, TextFields},
    render,
    state::AppState,
};
use axum::{
    Form,
    extract::{FromRequest, Multipart, Request, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse},
};
use tracing::{debug, warn};

const FILE_FIELD: &str = "travel_image";

/// Accept the form, run the submission and render the result.
///
/// Multipart is the normal encoding. A urlencoded body is read for its text
/// fields only, so validation still reports the first empty field.
pub async fn submit_memory(
    State(state): State<AppState>,
    request: Request,
) -> Result<Html<String>, SubmissionError> {
    let raw = if is_urlencoded(request.headers()) {
        let Form(fields) = Form::<TextFields>::from_request(request, &state)
            .await
            .map_err(|rejection| {
                warn!(error = %rejection, "rejected urlencoded submission");
                SubmissionError::UploadError(rejection.body_text())
            })?;
        RawSubmission::from(fields)
    } else {
        let mut multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| {
                warn!(error = %rejection, "rejected non-multipart submission");
                SubmissionError::UploadError(rejection.body_text())
            })?;
        read_submission(&mut multipart).await?
    };

    let done = state.submissions.submit(raw).await?;
    debug!(id = done.record.id, url = %done.image.url, "rendering confirmation");

    Ok(Html(render::success_page(&done.input, &done.image)))
}

/// Any method other than POST on `/submit`.
pub async fn invalid_method() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Html(render::error_message("Error", "Invalid request method")),
    )
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

/// Drain the form into a `RawSubmission`.
///
/// A transport error (including a body past the size limit) ends the request
/// as an upload error; fields not yet read are never reported as empty.
async fn read_submission(multipart: &mut Multipart) -> Result<RawSubmission, SubmissionError> {
    let mut raw = RawSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(transport_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == FILE_FIELD {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(transport_error)?;
            // browsers send an empty, unnamed part when no file was chosen
            raw.image = if filename.is_empty() && bytes.is_empty() {
                FileField::Missing
            } else {
                FileField::Received(ImageUpload::new(filename, content_type, bytes))
            };
        } else {
            let value = field.text().await.map_err(transport_error)?;
            raw.set_text(&name, value);
        }
    }

    Ok(raw)
}

fn transport_error(err: MultipartError) -> SubmissionError {
    warn!(error = %err, status = %err.status(), "multipart stream failed");
    SubmissionError::UploadError(err.body_text())
}
