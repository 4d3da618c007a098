//! Configuration module for pixelgate.

use serde::Deserialize;
use std::path::Path;

use crate::upload::{
    PolicyDefaults, StorageConfig, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_DAILY_UPLOAD_LIMIT,
    DEFAULT_GUEST_DURATIONS, DEFAULT_MAX_BATCH_SIZE_MB, DEFAULT_MAX_FILE_SIZE_MB,
    DEFAULT_USER_DURATIONS,
};
use crate::{GateError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/pixelgate.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/pixelgate.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Upload policy configuration.
///
/// These values are the fallbacks used when the dynamic settings group is
/// unreachable or a key is missing. The live values come from the settings
/// store.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Name of the settings group holding the upload policy.
    #[serde(default = "default_policy_group")]
    pub policy_group: String,
    /// Per-file size limit in megabytes (0 = unlimited).
    #[serde(default = "default_max_file_size_mb")]
    pub default_max_file_size_mb: u64,
    /// Batch size limit in megabytes (0 = unlimited).
    #[serde(default = "default_max_batch_size_mb")]
    pub default_max_batch_size_mb: u64,
    /// Extensions accepted when no allow-list is configured.
    #[serde(default = "default_allowed_extensions")]
    pub default_allowed_extensions: Vec<String>,
    /// Uploads per user per day (-1 = unlimited).
    #[serde(default = "default_daily_upload_limit")]
    pub default_daily_upload_limit: i64,
    /// Timezone whose calendar day bounds the daily quota (e.g., "Asia/Tokyo", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_policy_group() -> String {
    "upload".to_string()
}

fn default_max_file_size_mb() -> u64 {
    DEFAULT_MAX_FILE_SIZE_MB
}

fn default_max_batch_size_mb() -> u64 {
    DEFAULT_MAX_BATCH_SIZE_MB
}

fn default_allowed_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_daily_upload_limit() -> i64 {
    DEFAULT_DAILY_UPLOAD_LIMIT
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            policy_group: default_policy_group(),
            default_max_file_size_mb: default_max_file_size_mb(),
            default_max_batch_size_mb: default_max_batch_size_mb(),
            default_allowed_extensions: default_allowed_extensions(),
            default_daily_upload_limit: default_daily_upload_limit(),
            timezone: default_timezone(),
        }
    }
}

impl UploadConfig {
    /// Build the resolver fallbacks from this section.
    pub fn policy_defaults(&self) -> PolicyDefaults {
        PolicyDefaults::new(
            self.default_max_file_size_mb,
            self.default_max_batch_size_mb,
            self.default_allowed_extensions.iter().map(String::as_str),
            self.default_daily_upload_limit,
        )
    }
}

/// Storage duration configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfigSection {
    /// Name of the settings group holding the duration lists.
    #[serde(default = "default_storage_group")]
    pub settings_group: String,
    /// Durations registered users may choose.
    #[serde(default = "default_user_durations")]
    pub user_durations: Vec<String>,
    /// Durations guests may choose.
    #[serde(default = "default_guest_durations")]
    pub guest_durations: Vec<String>,
}

fn default_storage_group() -> String {
    "storage".to_string()
}

fn default_user_durations() -> Vec<String> {
    DEFAULT_USER_DURATIONS.iter().map(|d| d.to_string()).collect()
}

fn default_guest_durations() -> Vec<String> {
    DEFAULT_GUEST_DURATIONS.iter().map(|d| d.to_string()).collect()
}

impl Default for StorageConfigSection {
    fn default() -> Self {
        Self {
            settings_group: default_storage_group(),
            user_durations: default_user_durations(),
            guest_durations: default_guest_durations(),
        }
    }
}

impl StorageConfigSection {
    /// The storage config used when the settings store cannot provide one.
    pub fn fallback(&self) -> StorageConfig {
        StorageConfig::new(self.user_durations.clone(), self.guest_durations.clone())
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Upload policy fallbacks.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Storage duration fallbacks.
    #[serde(default)]
    pub storage: StorageConfigSection,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GateError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| GateError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PIXELGATE_DB_PATH`: Override the database path
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("PIXELGATE_DB_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - `upload.timezone` is not a known IANA timezone name
    /// - `upload.default_daily_upload_limit` is negative but not -1
    pub fn validate(&self) -> Result<()> {
        if self.upload.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(GateError::Config(format!(
                "unknown timezone: {}",
                self.upload.timezone
            )));
        }
        if self.upload.default_daily_upload_limit < -1 {
            return Err(GateError::Config(format!(
                "default_daily_upload_limit must be -1 (unlimited) or >= 0, got {}",
                self.upload.default_daily_upload_limit
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::DailyLimit;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database.path, "data/pixelgate.db");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/pixelgate.log");

        assert_eq!(config.upload.policy_group, "upload");
        assert_eq!(config.upload.default_max_file_size_mb, 100);
        assert_eq!(config.upload.default_max_batch_size_mb, 100);
        assert_eq!(config.upload.default_allowed_extensions.len(), 15);
        assert_eq!(config.upload.default_daily_upload_limit, 50);
        assert_eq!(config.upload.timezone, "UTC");

        assert_eq!(config.storage.settings_group, "storage");
        assert!(config.storage.user_durations.contains(&"permanent".to_string()));
        assert!(!config.storage.guest_durations.contains(&"permanent".to_string()));
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[database]
path = "custom/gate.db"

[logging]
level = "debug"
file = "custom/gate.log"

[upload]
policy_group = "uploads"
default_max_file_size_mb = 20
default_max_batch_size_mb = 0
default_allowed_extensions = ["png", "jpg"]
default_daily_upload_limit = -1
timezone = "Asia/Tokyo"

[storage]
settings_group = "retention"
user_durations = ["1d", "permanent"]
guest_durations = ["1d"]
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.database.path, "custom/gate.db");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.upload.policy_group, "uploads");
        assert_eq!(config.upload.default_max_file_size_mb, 20);
        assert_eq!(config.upload.default_max_batch_size_mb, 0);
        assert_eq!(config.upload.default_allowed_extensions, vec!["png", "jpg"]);
        assert_eq!(config.upload.timezone, "Asia/Tokyo");
        assert_eq!(config.storage.settings_group, "retention");
        assert_eq!(config.storage.guest_durations, vec!["1d"]);
        assert!(config.validate().is_ok());

        let defaults = config.upload.policy_defaults();
        assert_eq!(defaults.max_file_size_bytes, 20 * 1024 * 1024);
        assert_eq!(defaults.max_batch_size_bytes, 0);
        assert_eq!(defaults.daily_upload_limit, DailyLimit::Unlimited);
        assert!(defaults.allowed_extensions.contains("png"));
        assert!(!defaults.allowed_extensions.contains("gif"));
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[upload]
default_daily_upload_limit = 10
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.upload.default_daily_upload_limit, 10);
        assert_eq!(config.upload.default_max_file_size_mb, 100);
        assert_eq!(config.database.path, "data/pixelgate.db");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.upload.policy_group, "upload");
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = Config::parse("this is not valid toml [[[");
        assert!(matches!(result, Err(GateError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_timezone() {
        let mut config = Config::default();
        config.upload.timezone = "Mars/Olympus_Mons".to_string();
        assert!(matches!(config.validate(), Err(GateError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_negative_daily_limit() {
        let mut config = Config::default();
        config.upload.default_daily_upload_limit = -5;
        assert!(config.validate().is_err());

        config.upload.default_daily_upload_limit = -1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"from-file.db\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database.path, "from-file.db");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/pixelgate.toml");
        assert!(matches!(result, Err(GateError::Io(_))));
    }

    #[test]
    fn test_storage_fallback() {
        let config = Config::default();
        let storage = config.storage.fallback();
        assert!(storage.validate_duration("permanent", false).is_ok());
        assert!(storage.validate_duration("permanent", true).is_err());
    }
}
