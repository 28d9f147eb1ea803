//! Defines routes for the submission service.
//!
//! ## Structure
//! - `POST /submit`          — travel memory form (any other method is refused)
//! - `GET  /objects/{*key}`  — images kept by the local backend
//! - `GET  /healthz`, `GET /readyz` — probes

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        object_handlers::get_object,
        submission_handlers::{invalid_method, submit_memory},
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Build the router. Handlers share `AppState`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/submit", post(submit_memory).fallback(invalid_method))
        .route("/objects/{*key}", get(get_object))
}

/// Router with state and the request body limit applied.
///
/// The limit must sit above the 5 MiB image limit so oversized images reach
/// validation and are reported as too large. Bodies past the limit fail while
/// the form is read and are reported as upload errors.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    routes()
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
