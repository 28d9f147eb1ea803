use crate::services::{object_store::LocalObjectStore, submission_service::SubmissionService};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub submissions: SubmissionService,

    /// Present only for the local backend, whose objects this process serves.
    pub local_objects: Option<LocalObjectStore>,
}
