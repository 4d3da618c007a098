//! pixelgate - upload admission control
//!
//! Decides whether files may enter an image hosting pipeline, based on
//! policy read live from a dynamic settings store.

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod settings;
pub mod upload;

pub use config::Config;
pub use db::Database;
pub use error::{ErrorKind, GateError, Result};
pub use file::{FileRepository, FolderRepository};
pub use settings::{MemorySettings, SettingsRepository, SettingsSource};
pub use upload::{
    Admission, BatchCandidate, PolicyResolver, UploadCandidate, UploadGate, UploadPolicy,
};
