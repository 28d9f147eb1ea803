//! Relational persistence for submissions.
//!
//! Works against MySQL in production and SQLite for local runs and tests via
//! `sqlx::AnyPool`. The only text ever interpolated into SQL is the table
//! name, which is checked to be a plain identifier at construction.

use crate::models::{
    record::SubmissionRecord, stored_image::StoredImage, submission::SubmissionInput,
};
use sqlx::{
    AnyPool,
    any::{AnyPoolOptions, install_default_drivers},
};
use thiserror::Error;
use tracing::{debug, info};

const MAX_TABLE_NAME_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("table name `{0}` must be 1-64 ASCII letters, digits or underscores")]
    InvalidTableName(String),
    #[error("unsupported database url `{0}` (expected mysql:// or sqlite:)")]
    UnsupportedDatabase(String),
    #[error("insert did not report a row id")]
    MissingRowId,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    MySql,
    Sqlite,
}

impl SqlDialect {
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("mysql:") || url.starts_with("mariadb:") {
            Some(Self::MySql)
        } else if url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }

    fn create_table_sql(self, table: &str) -> String {
        let id_column = match self {
            Self::MySql => "id INT AUTO_INCREMENT PRIMARY KEY",
            Self::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
        };
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                {id_column},
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,
                location VARCHAR(255) NOT NULL,
                memory TEXT NOT NULL,
                image_url VARCHAR(500) NOT NULL,
                image_filename VARCHAR(255) NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )"
        )
    }
}

/// Ensures the submissions table and inserts one row per submission.
#[derive(Clone, Debug)]
pub struct RecordStore {
    pool: AnyPool,
    table: String,
    dialect: SqlDialect,
}

impl RecordStore {
    pub fn new(
        pool: AnyPool,
        table: impl Into<String>,
        dialect: SqlDialect,
    ) -> RecordStoreResult<Self> {
        let table = table.into();
        ensure_identifier(&table)?;
        Ok(Self {
            pool,
            table,
            dialect,
        })
    }

    /// Connect to `database_url`. In-memory SQLite gets a single long-lived
    /// connection so every query sees the same database.
    pub async fn connect(database_url: &str, table: &str) -> RecordStoreResult<Self> {
        install_default_drivers();
        let dialect = SqlDialect::from_url(database_url)
            .ok_or_else(|| RecordStoreError::UnsupportedDatabase(database_url.to_string()))?;
        ensure_identifier(table)?;

        let options = if database_url.contains(":memory:") {
            AnyPoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new().max_connections(5)
        };
        let pool = options.connect(database_url).await?;

        info!(table = %table, dialect = ?dialect, "Connected record store");
        Self::new(pool, table, dialect)
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the table if it is absent. Safe to issue on every request.
    pub async fn ensure_table(&self) -> RecordStoreResult<()> {
        sqlx::query(&self.dialect.create_table_sql(&self.table))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert one row with bound parameters and return it with its new id.
    pub async fn insert(
        &self,
        input: &SubmissionInput,
        image: &StoredImage,
    ) -> RecordStoreResult<SubmissionRecord> {
        let sql = format!(
            "INSERT INTO {} (name, email, location, memory, image_url, image_filename)
             VALUES (?, ?, ?, ?, ?, ?)",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(input.name.as_str())
            .bind(input.email.as_str())
            .bind(input.location.as_str())
            .bind(input.memory.as_str())
            .bind(image.url.as_str())
            .bind(image.file_name())
            .execute(&self.pool)
            .await?;

        let id = result
            .last_insert_id()
            .ok_or(RecordStoreError::MissingRowId)?;
        debug!(table = %self.table, id, "inserted submission record");

        Ok(SubmissionRecord {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            location: input.location.clone(),
            memory: input.memory.clone(),
            image_url: image.url.clone(),
            image_filename: image.file_name().to_string(),
        })
    }

    /// `SELECT 1`, for readiness checks.
    pub async fn ping(&self) -> RecordStoreResult<()> {
        let value: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        if value != 1 {
            return Err(RecordStoreError::Sqlx(sqlx::Error::Protocol(format!(
                "unexpected SELECT 1 result: {}",
                value
            ))));
        }
        Ok(())
    }
}

fn ensure_identifier(table: &str) -> RecordStoreResult<()> {
    let valid = !table.is_empty()
        && table.len() <= MAX_TABLE_NAME_LEN
        && !table.starts_with(|c: char| c.is_ascii_digit())
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RecordStoreError::InvalidTableName(table.to_string()))
    }
}
