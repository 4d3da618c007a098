//! Shared helpers for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};

use pixelgate::file::{Folder, FolderRepository, NewFileRecord, NewFolder};
use pixelgate::upload::{SettingsStorageConfig, StorageConfig};
use pixelgate::{Database, FileRepository, SettingsRepository, UploadGate};

/// Gate wired to SQLite repositories on one database.
pub type SqliteGate<'a> = UploadGate<
    SettingsRepository<'a>,
    FolderRepository<'a>,
    FileRepository<'a>,
    SettingsStorageConfig<SettingsRepository<'a>>,
>;

/// Open a fresh in-memory database.
pub async fn setup_db() -> Database {
    Database::open_in_memory()
        .await
        .expect("Failed to create test database")
}

/// Build a gate over `db` with built-in defaults.
pub fn gate(db: &Database) -> SqliteGate<'_> {
    let settings = SettingsRepository::new(db.pool());
    UploadGate::new(
        settings,
        FolderRepository::new(db.pool()),
        FileRepository::new(db.pool()),
        SettingsStorageConfig::new(settings, "storage", StorageConfig::default()),
    )
}

/// Create a folder owned by `user_id`.
pub async fn create_folder(db: &Database, user_id: i64, name: &str) -> Folder {
    FolderRepository::new(db.pool())
        .create(&NewFolder::new(user_id, name))
        .await
        .expect("Failed to create folder")
}

/// Record `count` uploads for `user_id` made at `at`.
pub async fn record_uploads(db: &Database, user_id: i64, count: usize, at: DateTime<Utc>) {
    let repo = FileRepository::new(db.pool());
    for i in 0..count {
        repo.create(&NewFileRecord::new(user_id, format!("img{i}.png"), 1024).with_created_at(at))
            .await
            .expect("Failed to record upload");
    }
}
