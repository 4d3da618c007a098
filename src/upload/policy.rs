//! Upload policy resolution.
//!
//! An [`UploadPolicy`] is rebuilt from the settings store on every request,
//! so changes made by an administrator apply to the next upload. Missing or
//! malformed keys fall back to [`PolicyDefaults`]; an unreachable store
//! falls back to the defaults wholesale.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_DAILY_UPLOAD_LIMIT, DEFAULT_MAX_BATCH_SIZE_MB,
    DEFAULT_MAX_FILE_SIZE_MB,
};
use crate::settings::{
    decode_integer, decode_megabytes, decode_string_list, SettingsGroup, SettingsSource,
    BYTES_PER_MB,
};
use crate::Result;

/// Settings key for the per-file limit (megabytes).
pub const KEY_MAX_FILE_SIZE: &str = "max_file_size";
/// Settings key for the batch limit (megabytes).
pub const KEY_MAX_BATCH_SIZE: &str = "max_batch_size";
/// Settings key for the extension allow-list.
pub const KEY_ALLOWED_FILE_FORMATS: &str = "allowed_file_formats";
/// Settings key for the per-user daily upload count.
pub const KEY_DAILY_UPLOAD_LIMIT: &str = "daily_upload_limit";

/// How many uploads a user may make per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyLimit {
    Unlimited,
    PerDay(u64),
}

impl DailyLimit {
    /// Interpret a raw setting: -1 is unlimited, other negatives are invalid.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            -1 => Some(DailyLimit::Unlimited),
            n if n >= 0 => Some(DailyLimit::PerDay(n as u64)),
            _ => None,
        }
    }
}

/// Which file extensions may be uploaded.
///
/// Entries are bare lowercase extensions (`png`, not `.png`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedExtensions {
    /// No allow-list is configured; the built-in default set applies.
    BuiltIn(BTreeSet<String>),
    /// An administrator configured the list. A malformed setting yields
    /// an empty list, which rejects everything.
    Configured(BTreeSet<String>),
}

impl AllowedExtensions {
    /// Check an extension as produced by [`super::file_extension`]
    /// (lowercase, leading dot).
    pub fn allows(&self, extension: &str) -> bool {
        let bare = extension.strip_prefix('.').unwrap_or(extension);
        !bare.is_empty() && self.set().contains(bare)
    }

    /// Whether the list came from the settings store.
    pub fn is_configured(&self) -> bool {
        matches!(self, AllowedExtensions::Configured(_))
    }

    fn set(&self) -> &BTreeSet<String> {
        match self {
            AllowedExtensions::BuiltIn(set) | AllowedExtensions::Configured(set) => set,
        }
    }
}

fn normalize_extensions<'a>(extensions: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    extensions
        .into_iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Fallback values used when a setting is missing, malformed, or the
/// settings store is down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDefaults {
    pub max_file_size_bytes: u64,
    pub max_batch_size_bytes: u64,
    pub allowed_extensions: BTreeSet<String>,
    pub daily_upload_limit: DailyLimit,
}

impl PolicyDefaults {
    /// Build defaults from megabyte sizes and a raw daily limit.
    ///
    /// A daily limit below -1 falls back to the built-in limit.
    pub fn new<'a>(
        max_file_size_mb: u64,
        max_batch_size_mb: u64,
        allowed_extensions: impl IntoIterator<Item = &'a str>,
        daily_upload_limit: i64,
    ) -> Self {
        Self {
            max_file_size_bytes: max_file_size_mb.saturating_mul(BYTES_PER_MB),
            max_batch_size_bytes: max_batch_size_mb.saturating_mul(BYTES_PER_MB),
            allowed_extensions: normalize_extensions(allowed_extensions),
            daily_upload_limit: DailyLimit::from_raw(daily_upload_limit)
                .unwrap_or(DailyLimit::PerDay(DEFAULT_DAILY_UPLOAD_LIMIT as u64)),
        }
    }
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_FILE_SIZE_MB,
            DEFAULT_MAX_BATCH_SIZE_MB,
            DEFAULT_ALLOWED_EXTENSIONS.iter().copied(),
            DEFAULT_DAILY_UPLOAD_LIMIT,
        )
    }
}

/// Effective upload limits for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Per-file limit in bytes (0 = unlimited).
    pub max_file_size_bytes: u64,
    /// Limit on the sum of a batch in bytes (0 = unlimited).
    pub max_batch_size_bytes: u64,
    pub allowed_extensions: AllowedExtensions,
    pub daily_upload_limit: DailyLimit,
}

impl UploadPolicy {
    /// The policy used when nothing is configured.
    pub fn from_defaults(defaults: &PolicyDefaults) -> Self {
        Self {
            max_file_size_bytes: defaults.max_file_size_bytes,
            max_batch_size_bytes: defaults.max_batch_size_bytes,
            allowed_extensions: AllowedExtensions::BuiltIn(defaults.allowed_extensions.clone()),
            daily_upload_limit: defaults.daily_upload_limit,
        }
    }

    /// Decode a settings group, field by field.
    pub fn from_group(group: &SettingsGroup, defaults: &PolicyDefaults) -> Self {
        let max_file_size_bytes = group
            .get(KEY_MAX_FILE_SIZE)
            .and_then(decode_megabytes)
            .unwrap_or(defaults.max_file_size_bytes);

        let max_batch_size_bytes = group
            .get(KEY_MAX_BATCH_SIZE)
            .and_then(decode_megabytes)
            .unwrap_or(defaults.max_batch_size_bytes);

        let allowed_extensions = match group.get(KEY_ALLOWED_FILE_FORMATS) {
            None => AllowedExtensions::BuiltIn(defaults.allowed_extensions.clone()),
            Some(value) => {
                let list = decode_string_list(value).unwrap_or_else(|| {
                    warn!(
                        key = KEY_ALLOWED_FILE_FORMATS,
                        "allow-list is not a list, rejecting every file type"
                    );
                    Vec::new()
                });
                AllowedExtensions::Configured(normalize_extensions(list.iter().map(String::as_str)))
            }
        };

        let daily_upload_limit = group
            .get(KEY_DAILY_UPLOAD_LIMIT)
            .and_then(decode_integer)
            .and_then(DailyLimit::from_raw)
            .unwrap_or(defaults.daily_upload_limit);

        Self {
            max_file_size_bytes,
            max_batch_size_bytes,
            allowed_extensions,
            daily_upload_limit,
        }
    }

    /// Whether a single file of `size` bytes is over the per-file limit.
    pub fn file_too_large(&self, size: u64) -> bool {
        self.max_file_size_bytes > 0 && size > self.max_file_size_bytes
    }

    /// Whether a batch totalling `total` bytes is over the batch limit.
    pub fn batch_too_large(&self, total: u64) -> bool {
        self.max_batch_size_bytes > 0 && total > self.max_batch_size_bytes
    }
}

/// Render a byte limit in megabytes for messages.
pub fn format_megabytes(bytes: u64) -> String {
    if bytes % BYTES_PER_MB == 0 {
        format!("{}MB", bytes / BYTES_PER_MB)
    } else {
        format!("{:.1}MB", bytes as f64 / BYTES_PER_MB as f64)
    }
}

/// Builds [`UploadPolicy`] values from a settings source.
#[derive(Debug, Clone)]
pub struct PolicyResolver<S> {
    source: S,
    defaults: PolicyDefaults,
}

impl<S: SettingsSource> PolicyResolver<S> {
    /// Create a resolver with the built-in defaults.
    pub fn new(source: S) -> Self {
        Self::with_defaults(source, PolicyDefaults::default())
    }

    /// Create a resolver with custom fallbacks.
    pub fn with_defaults(source: S, defaults: PolicyDefaults) -> Self {
        Self { source, defaults }
    }

    /// The fallbacks this resolver applies.
    pub fn defaults(&self) -> &PolicyDefaults {
        &self.defaults
    }

    /// The underlying settings source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve a group, reporting a settings transport failure as `Err`.
    ///
    /// Missing and malformed keys are never errors.
    pub async fn fetch(&self, group_name: &str) -> Result<UploadPolicy> {
        let group = self.source.get_settings_group(group_name).await?;
        let policy = UploadPolicy::from_group(&group, &self.defaults);
        debug!(group = group_name, ?policy, "resolved upload policy");
        Ok(policy)
    }

    /// Resolve a group, using the defaults if the settings store fails.
    pub async fn resolve(&self, group_name: &str) -> UploadPolicy {
        match self.fetch(group_name).await {
            Ok(policy) => policy,
            Err(e) => {
                warn!(group = group_name, error = %e, "failed to read upload settings, using defaults");
                UploadPolicy::from_defaults(&self.defaults)
            }
        }
    }
}
