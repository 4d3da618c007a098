//! Upload admission control.
//!
//! Decides whether an incoming upload (or batch) may proceed to storage:
//! - Per-file and per-batch size limits
//! - Extension allow-list
//! - Target folder ownership
//! - Requested storage duration
//! - Per-user daily upload quota
//!
//! Limits come from the `upload` settings group and are re-read on every
//! check.

mod batch;
mod candidate;
mod folder_check;
mod gate;
mod policy;
mod quota;
mod storage_duration;
mod validator;

pub use batch::{validate_batch, BatchValidator};
pub use candidate::{file_extension, BatchCandidate, UploadCandidate, NULL_FOLDER_SENTINEL};
pub use folder_check::{FolderLookup, FolderOwnershipChecker};
pub use gate::{Admission, UploadGate};
pub use policy::{
    format_megabytes, AllowedExtensions, DailyLimit, PolicyDefaults, PolicyResolver,
    UploadPolicy, KEY_ALLOWED_FILE_FORMATS, KEY_DAILY_UPLOAD_LIMIT, KEY_MAX_BATCH_SIZE,
    KEY_MAX_FILE_SIZE,
};
pub use quota::{QuotaEnforcer, UploadHistory};
pub use storage_duration::{
    storage_config_or, SettingsStorageConfig, StorageConfig, StorageConfigSource,
    StorageDuration, StorageDurationError, KEY_GUEST_DURATIONS, KEY_USER_DURATIONS,
};
pub use validator::UploadValidator;

/// Settings group holding the upload policy.
pub const UPLOAD_POLICY_GROUP: &str = "upload";

/// Default per-file size limit (100MB).
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 100;

/// Default batch size limit (100MB).
pub const DEFAULT_MAX_BATCH_SIZE_MB: u64 = 100;

/// Default uploads per user per day.
pub const DEFAULT_DAILY_UPLOAD_LIMIT: i64 = 50;

/// Image formats accepted when no allow-list is configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "apng", "svg", "ico", "jp2", "tiff", "tif",
    "tga", "heic", "heif",
];

/// Storage durations offered to registered users by default.
pub const DEFAULT_USER_DURATIONS: &[&str] = &["1h", "3d", "7d", "30d", "permanent"];

/// Storage durations offered to guests by default.
pub const DEFAULT_GUEST_DURATIONS: &[&str] = &["1h", "3d", "7d"];
