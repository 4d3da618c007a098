//! Validation of a single upload.

use super::candidate::{file_extension, UploadCandidate};
use super::folder_check::{FolderLookup, FolderOwnershipChecker};
use super::policy::{format_megabytes, UploadPolicy};
use super::storage_duration::{storage_config_or, StorageConfig, StorageConfigSource};
use crate::{GateError, Result};

/// Checks one candidate against an already resolved policy.
///
/// Checks run in order and stop at the first failure: size, extension,
/// then either folder ownership or storage duration. A candidate targeting
/// a folder is settled by the ownership check alone.
pub struct UploadValidator<'a, F, C> {
    folders: FolderOwnershipChecker<'a, F>,
    storage: &'a C,
    fallback_storage: &'a StorageConfig,
}

impl<'a, F: FolderLookup, C: StorageConfigSource> UploadValidator<'a, F, C> {
    /// Create a new validator.
    ///
    /// `fallback_storage` is used when `storage` cannot produce a config.
    pub fn new(folders: &'a F, storage: &'a C, fallback_storage: &'a StorageConfig) -> Self {
        Self {
            folders: FolderOwnershipChecker::new(folders),
            storage,
            fallback_storage,
        }
    }

    /// Validate `candidate`, filling in its `extension`.
    pub async fn validate(&self, candidate: &mut UploadCandidate, policy: &UploadPolicy) -> Result<()> {
        if policy.file_too_large(candidate.size_bytes) {
            return Err(GateError::FileTooLarge(format!(
                "file size must not exceed {}",
                format_megabytes(policy.max_file_size_bytes)
            )));
        }

        candidate.extension = file_extension(&candidate.filename);
        if !policy.allowed_extensions.allows(&candidate.extension) {
            return Err(GateError::FileTypeNotSupported(format!(
                "format '{}' is not allowed, ask an administrator to enable it",
                candidate.extension
            )));
        }

        if let Some(folder_id) = candidate.folder() {
            return self.folders.check(folder_id, candidate.user_id).await;
        }

        if !candidate.storage_duration.is_empty() {
            let config = storage_config_or(self.storage, self.fallback_storage).await;
            config
                .validate_duration(&candidate.storage_duration, candidate.is_guest_upload)
                .map_err(|e| GateError::InvalidParameter(e.to_string()))?;
        }

        Ok(())
    }
}
