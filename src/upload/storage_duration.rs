//! Retention (storage duration) policy.
//!
//! Uploaders may ask for a file to expire after a while. Which durations
//! are on offer depends on whether the uploader is a registered user or a
//! guest. Expiry itself is carried out elsewhere; this module only checks
//! the request.

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

use super::{DEFAULT_GUEST_DURATIONS, DEFAULT_USER_DURATIONS};
use crate::settings::{decode_string_list, SettingsSource};
use crate::Result;

/// Settings key listing durations for registered users.
pub const KEY_USER_DURATIONS: &str = "user_durations";
/// Settings key listing durations for guests.
pub const KEY_GUEST_DURATIONS: &str = "guest_durations";

const PERMANENT: &str = "permanent";

/// A parsed storage duration token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDuration {
    Permanent,
    Limited(Duration),
}

impl StorageDuration {
    /// Parse `permanent` or `<n><m|h|d>` with `n > 0`.
    pub fn parse(token: &str) -> std::result::Result<Self, StorageDurationError> {
        let malformed = || StorageDurationError::Malformed(token.to_string());
        let token = token.trim();
        if token.eq_ignore_ascii_case(PERMANENT) {
            return Ok(StorageDuration::Permanent);
        }

        let unit = token.chars().last().ok_or_else(malformed)?;
        let amount: i64 = token[..token.len() - unit.len_utf8()]
            .parse()
            .map_err(|_| malformed())?;
        if amount <= 0 {
            return Err(malformed());
        }
        let duration = match unit {
            'm' => Duration::try_minutes(amount),
            'h' => Duration::try_hours(amount),
            'd' => Duration::try_days(amount),
            _ => None,
        }
        .ok_or_else(malformed)?;
        Ok(StorageDuration::Limited(duration))
    }
}

/// Reasons a requested storage duration is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageDurationError {
    #[error("invalid storage duration: {0}")]
    Malformed(String),

    #[error("storage duration {0} is not available for guest uploads")]
    NotAllowedForGuest(String),

    #[error("storage duration {0} is not available")]
    NotAllowed(String),
}

/// Durations offered to each class of uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub user_durations: Vec<String>,
    pub guest_durations: Vec<String>,
}

impl StorageConfig {
    pub fn new(user_durations: Vec<String>, guest_durations: Vec<String>) -> Self {
        Self {
            user_durations,
            guest_durations,
        }
    }

    /// Check a requested token for a guest or registered uploader.
    pub fn validate_duration(
        &self,
        token: &str,
        is_guest: bool,
    ) -> std::result::Result<StorageDuration, StorageDurationError> {
        let duration = StorageDuration::parse(token)?;
        let offered = if is_guest {
            &self.guest_durations
        } else {
            &self.user_durations
        };

        let listed = offered
            .iter()
            .any(|d| StorageDuration::parse(d).is_ok_and(|d| d == duration));
        if listed {
            return Ok(duration);
        }

        let token = token.trim().to_string();
        Err(if is_guest {
            StorageDurationError::NotAllowedForGuest(token)
        } else {
            StorageDurationError::NotAllowed(token)
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_USER_DURATIONS.iter().map(|d| d.to_string()).collect(),
            DEFAULT_GUEST_DURATIONS.iter().map(|d| d.to_string()).collect(),
        )
    }
}

/// Produces the current [`StorageConfig`].
#[allow(async_fn_in_trait)]
pub trait StorageConfigSource {
    async fn create_storage_config(&self) -> Result<StorageConfig>;
}

impl StorageConfigSource for StorageConfig {
    async fn create_storage_config(&self) -> Result<StorageConfig> {
        Ok(self.clone())
    }
}

/// Reads duration lists from a settings group.
///
/// Keys that are missing or not lists keep the fallback's list.
#[derive(Debug, Clone)]
pub struct SettingsStorageConfig<S> {
    source: S,
    group: String,
    fallback: StorageConfig,
}

impl<S: SettingsSource> SettingsStorageConfig<S> {
    pub fn new(source: S, group: impl Into<String>, fallback: StorageConfig) -> Self {
        Self {
            source,
            group: group.into(),
            fallback,
        }
    }
}

impl<S: SettingsSource> StorageConfigSource for SettingsStorageConfig<S> {
    async fn create_storage_config(&self) -> Result<StorageConfig> {
        let group = self.source.get_settings_group(&self.group).await?;
        let list = |key: &str, fallback: &Vec<String>| {
            group
                .get(key)
                .and_then(decode_string_list)
                .unwrap_or_else(|| fallback.clone())
        };
        Ok(StorageConfig::new(
            list(KEY_USER_DURATIONS, &self.fallback.user_durations),
            list(KEY_GUEST_DURATIONS, &self.fallback.guest_durations),
        ))
    }
}

/// Fetch a storage config, substituting `fallback` on failure.
pub async fn storage_config_or<C: StorageConfigSource>(
    source: &C,
    fallback: &StorageConfig,
) -> StorageConfig {
    match source.create_storage_config().await {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "failed to load storage config, using defaults");
            fallback.clone()
        }
    }
}
