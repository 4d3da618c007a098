//! SQLite-backed settings store.

use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;

use super::{SettingsGroup, SettingsSource};
use crate::Result;

/// Repository for the `settings` table.
///
/// Values are stored as JSON text. A row whose text is not valid JSON is
/// surfaced as a JSON string so it decodes to the field default instead of
/// failing the whole group.
#[derive(Debug, Clone, Copy)]
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new SettingsRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace one value.
    pub async fn set(&self, group: &str, key: &str, value: &Value) -> Result<()> {
        self.set_raw(group, key, &value.to_string()).await
    }

    /// Store raw text as-is, without JSON encoding it first.
    pub async fn set_raw(&self, group: &str, key: &str, raw: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (group_name, key, value) VALUES (?, ?, ?)
             ON CONFLICT (group_name, key)
             DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        )
        .bind(group)
        .bind(key)
        .bind(raw)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Delete one value. Returns whether a row was removed.
    pub async fn delete(&self, group: &str, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM settings WHERE group_name = ? AND key = ?")
            .bind(group)
            .bind(key)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

impl SettingsSource for SettingsRepository<'_> {
    async fn get_settings_group(&self, name: &str) -> Result<SettingsGroup> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM settings WHERE group_name = ?")
                .bind(name)
                .fetch_all(self.pool)
                .await?;

        debug!(group = name, keys = rows.len(), "loaded settings group");
        Ok(rows
            .into_iter()
            .map(|(key, raw)| (key, parse_value(&raw)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_preserves_json_types() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SettingsRepository::new(db.pool());

        repo.set("upload", "max_file_size", &json!(20.5)).await.unwrap();
        repo.set("upload", "allowed_file_formats", &json!(["png", "jpg"]))
            .await
            .unwrap();

        let group = repo.get_settings_group("upload").await.unwrap();
        assert_eq!(group["max_file_size"], json!(20.5));
        assert_eq!(group["allowed_file_formats"], json!(["png", "jpg"]));
        assert!(!group.contains_key("missing"));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SettingsRepository::new(db.pool());

        repo.set("upload", "daily_upload_limit", &json!(50)).await.unwrap();
        repo.set("upload", "daily_upload_limit", &json!(-1)).await.unwrap();

        let group = repo.get_settings_group("upload").await.unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group["daily_upload_limit"], json!(-1));
    }

    #[tokio::test]
    async fn test_group_isolation_and_empty_group() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SettingsRepository::new(db.pool());

        repo.set("storage", "user_durations", &json!(["1d"])).await.unwrap();

        assert!(repo.get_settings_group("upload").await.unwrap().is_empty());
        assert_eq!(repo.get_settings_group("storage").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_becomes_string() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SettingsRepository::new(db.pool());

        repo.set_raw("upload", "max_file_size", "twenty").await.unwrap();

        let group = repo.get_settings_group("upload").await.unwrap();
        assert_eq!(group["max_file_size"], json!("twenty"));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SettingsRepository::new(db.pool());

        repo.set("upload", "max_file_size", &json!(1)).await.unwrap();
        assert!(repo.delete("upload", "max_file_size").await.unwrap());
        assert!(!repo.delete("upload", "max_file_size").await.unwrap());
    }
}
