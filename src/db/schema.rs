//! Database schema and migrations for pixelgate.
//!
//! Migrations run in order; the schema_version table records which
//! ones have been applied.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Dynamic settings, grouped by name
    r#"
CREATE TABLE settings (
    group_name  TEXT NOT NULL,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,           -- JSON encoded
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (group_name, key)
);
"#,
    // v2: Per-user folders
    r#"
CREATE TABLE folders (
    id          TEXT PRIMARY KEY,        -- UUID v4
    user_id     INTEGER NOT NULL,
    name        TEXT NOT NULL,
    parent_id   TEXT REFERENCES folders(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_folders_user_id ON folders(user_id);
"#,
    // v3: Uploaded file records
    r#"
CREATE TABLE files (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id           INTEGER NOT NULL,
    folder_id         TEXT REFERENCES folders(id) ON DELETE SET NULL,
    filename          TEXT NOT NULL,
    extension         TEXT NOT NULL,
    size              INTEGER NOT NULL,
    storage_duration  TEXT,
    is_guest          INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_user_created ON files(user_id, created_at);
"#,
];
