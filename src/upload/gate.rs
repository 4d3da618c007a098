//! Upload admission facade for request handlers.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use super::batch::BatchValidator;
use super::candidate::{BatchCandidate, UploadCandidate};
use super::folder_check::FolderLookup;
use super::policy::{PolicyResolver, UploadPolicy};
use super::quota::{QuotaEnforcer, UploadHistory};
use super::storage_duration::{StorageConfig, StorageConfigSource};
use super::validator::UploadValidator;
use super::UPLOAD_POLICY_GROUP;
use crate::config::Config;
use crate::datetime::parse_timezone;
use crate::settings::SettingsSource;
use crate::Result;

/// Outcome of [`UploadGate::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    QuotaExceeded,
}

/// All admission checks over one set of collaborators.
///
/// Holds no per-request state; every call re-reads the settings store.
pub struct UploadGate<S, F, H, C> {
    resolver: PolicyResolver<S>,
    folders: F,
    history: H,
    storage: C,
    fallback_storage: StorageConfig,
    policy_group: String,
    timezone: Tz,
}

impl<S, F, H, C> UploadGate<S, F, H, C>
where
    S: SettingsSource,
    F: FolderLookup,
    H: UploadHistory,
    C: StorageConfigSource,
{
    /// Create a gate with built-in defaults, the `upload` group and UTC days.
    pub fn new(settings: S, folders: F, history: H, storage: C) -> Self {
        Self {
            resolver: PolicyResolver::new(settings),
            folders,
            history,
            storage,
            fallback_storage: StorageConfig::default(),
            policy_group: UPLOAD_POLICY_GROUP.to_string(),
            timezone: Tz::UTC,
        }
    }

    /// Create a gate using the fallbacks, group name and timezone from `config`.
    pub fn from_config(config: &Config, settings: S, folders: F, history: H, storage: C) -> Self {
        Self {
            resolver: PolicyResolver::with_defaults(settings, config.upload.policy_defaults()),
            folders,
            history,
            storage,
            fallback_storage: config.storage.fallback(),
            policy_group: config.upload.policy_group.clone(),
            timezone: parse_timezone(&config.upload.timezone),
        }
    }

    /// The resolver used by every check.
    pub fn resolver(&self) -> &PolicyResolver<S> {
        &self.resolver
    }

    /// Current policy, with defaults substituted if settings are unreachable.
    pub async fn policy(&self) -> UploadPolicy {
        self.resolver.resolve(&self.policy_group).await
    }

    /// Validate one upload against the live policy.
    pub async fn validate_upload(&self, candidate: &mut UploadCandidate) -> Result<()> {
        let policy = self.policy().await;
        self.validate_upload_with(candidate, &policy).await
    }

    /// Validate one upload against a policy the caller already holds.
    pub async fn validate_upload_with(
        &self,
        candidate: &mut UploadCandidate,
        policy: &UploadPolicy,
    ) -> Result<()> {
        UploadValidator::new(&self.folders, &self.storage, &self.fallback_storage)
            .validate(candidate, policy)
            .await
    }

    /// Validate the sizes of a multi-file upload.
    pub async fn validate_batch(&self, candidates: &[BatchCandidate]) -> Result<()> {
        BatchValidator::new(&self.resolver, &self.policy_group)
            .validate(candidates)
            .await
    }

    /// Whether `pending` more uploads today would exceed the user's quota.
    pub async fn would_exceed_daily_limit(&self, user_id: i64, pending: u64) -> Result<bool> {
        self.quota().would_exceed_daily_limit(user_id, pending).await
    }

    /// [`would_exceed_daily_limit`](Self::would_exceed_daily_limit) for the day containing `now`.
    pub async fn would_exceed_daily_limit_at(
        &self,
        user_id: i64,
        pending: u64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.quota()
            .would_exceed_daily_limit_at(user_id, pending, now)
            .await
    }

    /// Validate one upload, then check the quota for it.
    pub async fn admit(&self, candidate: &mut UploadCandidate) -> Result<Admission> {
        self.admit_at(candidate, Utc::now()).await
    }

    /// [`admit`](Self::admit) with the quota day taken from `now`.
    pub async fn admit_at(
        &self,
        candidate: &mut UploadCandidate,
        now: DateTime<Utc>,
    ) -> Result<Admission> {
        self.validate_upload(candidate).await?;

        if self
            .would_exceed_daily_limit_at(candidate.user_id, 1, now)
            .await?
        {
            info!(user_id = candidate.user_id, "daily upload limit reached");
            return Ok(Admission::QuotaExceeded);
        }

        debug!(
            user_id = candidate.user_id,
            filename = %candidate.filename,
            "upload admitted"
        );
        Ok(Admission::Admitted)
    }

    fn quota(&self) -> QuotaEnforcer<'_, S, H> {
        QuotaEnforcer::new(&self.resolver, &self.history, &self.policy_group, self.timezone)
    }
}
