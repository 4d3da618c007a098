//! Folder types and repository.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::upload::FolderLookup;
use crate::{GateError, Result};

/// A folder owned by one user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Folder {
    /// Folder ID (UUID string).
    pub id: String,
    /// Owning user.
    pub user_id: i64,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for top-level folders).
    pub parent_id: Option<String>,
    /// When the folder was created (SQLite datetime, UTC).
    pub created_at: String,
}

impl Folder {
    /// Get the created_at as DateTime<Utc>.
    pub fn created_at_datetime(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Owning user.
    pub user_id: i64,
    /// Folder name.
    pub name: String,
}

impl NewFolder {
    /// Create a new top-level folder for a user.
    pub fn new(user_id: i64, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}

/// Repository for folder operations.
#[derive(Debug, Clone, Copy)]
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder with a fresh UUID.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO folders (id, user_id, name) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(folder.user_id)
            .bind(&folder.name)
            .execute(self.pool)
            .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| GateError::FolderNotFound(id))
    }

    /// Get a folder by ID regardless of owner.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, user_id, name, parent_id, created_at FROM folders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(folder)
    }

    /// Get a folder by ID only if it belongs to the user.
    pub async fn get_owned(&self, id: &str, user_id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, user_id, name, parent_id, created_at
             FROM folders WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(folder)
    }

}

impl FolderLookup for FolderRepository<'_> {
    async fn find_owned(&self, folder_id: &str, user_id: i64) -> Result<Option<Folder>> {
        self.get_owned(folder_id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = FolderRepository::new(db.pool());

        let folder = repo.create(&NewFolder::new(1, "holiday")).await.unwrap();
        assert_eq!(folder.user_id, 1);
        assert_eq!(folder.name, "holiday");
        assert!(folder.parent_id.is_none());
        assert!(Uuid::parse_str(&folder.id).is_ok());
        assert!(folder.created_at_datetime().is_some());

        let fetched = repo.get_by_id(&folder.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, folder.id);
    }

    #[tokio::test]
    async fn test_get_owned_checks_owner() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = FolderRepository::new(db.pool());

        let folder = repo.create(&NewFolder::new(1, "mine")).await.unwrap();

        assert!(repo.get_owned(&folder.id, 1).await.unwrap().is_some());
        assert!(repo.get_owned(&folder.id, 2).await.unwrap().is_none());
        assert!(repo.get_owned("no-such-folder", 1).await.unwrap().is_none());
    }
}
