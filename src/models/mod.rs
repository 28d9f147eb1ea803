//! Data carried through one submission request.
//!
//! A `RawSubmission` is validated into a `SubmissionInput`, its image becomes a
//! `StoredImage` once uploaded, and both end up in a `SubmissionRecord`.

pub mod record;
pub mod stored_image;
pub mod submission;
