//! In-process settings store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use super::{SettingsGroup, SettingsSource};
use crate::{GateError, Result};

/// Settings held in memory, keyed by group then key.
///
/// Useful for embedding the admission engine without a database and for
/// tests that need to change policy between calls.
#[derive(Debug, Default)]
pub struct MemorySettings {
    groups: RwLock<HashMap<String, SettingsGroup>>,
}

impl MemorySettings {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of one value.
    pub fn with(mut self, group: &str, key: &str, value: Value) -> Self {
        self.groups
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(group.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self
    }

    /// Set one value, replacing any previous one.
    pub fn set(&self, group: &str, key: &str, value: Value) -> Result<()> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| GateError::Settings("settings lock poisoned".to_string()))?;
        groups
            .entry(group.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    /// Remove one value. Returns whether it existed.
    pub fn remove(&self, group: &str, key: &str) -> Result<bool> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| GateError::Settings("settings lock poisoned".to_string()))?;
        Ok(groups
            .get_mut(group)
            .and_then(|g| g.remove(key))
            .is_some())
    }
}

impl SettingsSource for MemorySettings {
    async fn get_settings_group(&self, name: &str) -> Result<SettingsGroup> {
        let groups = self
            .groups
            .read()
            .map_err(|_| GateError::Settings("settings lock poisoned".to_string()))?;
        Ok(groups.get(name).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_group_is_empty() {
        let settings = MemorySettings::new();
        let group = settings.get_settings_group("upload").await.unwrap();
        assert!(group.is_empty());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let settings = MemorySettings::new().with("upload", "max_file_size", json!(20));
        settings.set("upload", "daily_upload_limit", json!(5)).unwrap();
        settings.set("other", "max_file_size", json!(1)).unwrap();

        let group = settings.get_settings_group("upload").await.unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group["max_file_size"], json!(20));
        assert_eq!(group["daily_upload_limit"], json!(5));
    }

    #[tokio::test]
    async fn test_builder_chains_and_overwrites() {
        let settings = MemorySettings::new()
            .with("upload", "max_file_size", json!(20))
            .with("upload", "max_file_size", json!(30))
            .with("storage", "user_durations", json!(["1d"]));

        let upload = settings.get_settings_group("upload").await.unwrap();
        assert_eq!(upload.len(), 1);
        assert_eq!(upload["max_file_size"], json!(30));
        let storage = settings.get_settings_group("storage").await.unwrap();
        assert_eq!(storage["user_durations"], json!(["1d"]));
    }

    #[tokio::test]
    async fn test_remove() {
        let settings = MemorySettings::new().with("upload", "max_file_size", json!(20));
        assert!(settings.remove("upload", "max_file_size").unwrap());
        assert!(!settings.remove("upload", "max_file_size").unwrap());
        assert!(!settings.remove("missing", "max_file_size").unwrap());

        let group = settings.get_settings_group("upload").await.unwrap();
        assert!(group.is_empty());
    }
}
