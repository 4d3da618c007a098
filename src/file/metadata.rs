//! Uploaded file records and repository.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::SqlitePool;

use crate::datetime::to_sqlite;
use crate::upload::UploadHistory;
use crate::{GateError, Result};

/// A stored upload.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID.
    pub id: i64,
    /// Uploader.
    pub user_id: i64,
    /// Folder the file was placed in, if any.
    pub folder_id: Option<String>,
    /// Original filename.
    pub filename: String,
    /// Lowercase extension including the leading dot.
    pub extension: String,
    /// Size in bytes.
    pub size: i64,
    /// Requested storage duration token.
    pub storage_duration: Option<String>,
    /// Whether this was a guest upload.
    pub is_guest: bool,
    /// When the file was uploaded (SQLite datetime, UTC).
    pub created_at: String,
}

impl FileRecord {
    /// Get the created_at as DateTime<Utc>.
    pub fn created_at_datetime(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Data for recording a new upload.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub user_id: i64,
    pub folder_id: Option<String>,
    pub filename: String,
    pub extension: String,
    pub size: i64,
    pub storage_duration: Option<String>,
    pub is_guest: bool,
    /// Upload time; the database clock is used when unset.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewFileRecord {
    /// Create a new record for a user's upload.
    pub fn new(user_id: i64, filename: impl Into<String>, size: i64) -> Self {
        let filename = filename.into();
        let extension = crate::upload::file_extension(&filename);
        Self {
            user_id,
            folder_id: None,
            filename,
            extension,
            size,
            storage_duration: None,
            is_guest: false,
            created_at: None,
        }
    }

    /// Set the folder.
    pub fn with_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    /// Set the storage duration token.
    pub fn with_storage_duration(mut self, token: impl Into<String>) -> Self {
        self.storage_duration = Some(token.into());
        self
    }

    /// Mark as a guest upload.
    pub fn as_guest(mut self) -> Self {
        self.is_guest = true;
        self
    }

    /// Set an explicit upload time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Repository for file records.
#[derive(Debug, Clone, Copy)]
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an upload.
    pub async fn create(&self, file: &NewFileRecord) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files
                (user_id, folder_id, filename, extension, size, storage_duration, is_guest, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, COALESCE(?, datetime('now')))",
        )
        .bind(file.user_id)
        .bind(&file.folder_id)
        .bind(&file.filename)
        .bind(&file.extension)
        .bind(file.size)
        .bind(&file.storage_duration)
        .bind(file.is_guest)
        .bind(file.created_at.as_ref().map(to_sqlite))
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| GateError::Database(format!("file {id} missing after insert")))
    }

    /// Get a file record by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(
            "SELECT id, user_id, folder_id, filename, extension, size, storage_duration, is_guest, created_at
             FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(file)
    }

    /// Count a user's uploads with `start <= created_at < end`.
    pub async fn count_by_user_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files WHERE user_id = ? AND created_at >= ? AND created_at < ?",
        )
        .bind(user_id)
        .bind(to_sqlite(&start))
        .bind(to_sqlite(&end))
        .fetch_one(self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }
}

impl UploadHistory for FileRepository<'_> {
    async fn count_uploads_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        self.count_by_user_between(user_id, start, end).await
    }
}
