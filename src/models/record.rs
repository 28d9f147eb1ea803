//! A persisted submission row.

/// One row of the submissions table.
///
/// `created_at` is assigned by the database default and is not read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    /// Auto-incrementing id assigned by the database.
    pub id: i64,
    pub name: String,
    pub email: String,
    pub location: String,
    pub memory: String,
    pub image_url: String,
    pub image_filename: String,
}
