//! Size validation for multi-file uploads.
//!
//! Only sizes are checked here. Extension and folder checks run per file
//! through [`super::UploadValidator`].

use super::candidate::BatchCandidate;
use super::policy::{format_megabytes, PolicyResolver, UploadPolicy};
use crate::settings::SettingsSource;
use crate::{GateError, Result};

/// Check every file against the per-file limit, then the total against the
/// batch limit. Stops at the first oversized file.
pub fn validate_batch(candidates: &[BatchCandidate], policy: &UploadPolicy) -> Result<()> {
    let mut total: u64 = 0;
    for candidate in candidates {
        if policy.file_too_large(candidate.size_bytes) {
            return Err(GateError::FileTooLarge(format!(
                "file {} exceeds the per-file limit of {}",
                candidate.filename,
                format_megabytes(policy.max_file_size_bytes)
            )));
        }
        total = total.saturating_add(candidate.size_bytes);
    }

    if policy.batch_too_large(total) {
        return Err(GateError::FileTooLarge(format!(
            "batch upload total must not exceed {}",
            format_megabytes(policy.max_batch_size_bytes)
        )));
    }
    Ok(())
}

/// Resolves the policy once per batch and applies [`validate_batch`].
pub struct BatchValidator<'a, S> {
    resolver: &'a PolicyResolver<S>,
    policy_group: &'a str,
}

impl<'a, S: SettingsSource> BatchValidator<'a, S> {
    pub fn new(resolver: &'a PolicyResolver<S>, policy_group: &'a str) -> Self {
        Self {
            resolver,
            policy_group,
        }
    }

    pub async fn validate(&self, candidates: &[BatchCandidate]) -> Result<()> {
        let policy = self.resolver.resolve(self.policy_group).await;
        validate_batch(candidates, &policy)
    }
}
