//! Dynamic settings for pixelgate.
//!
//! Settings are stored as loosely typed JSON values grouped by name
//! (e.g. the `upload` group). Consumers never pass these values around:
//! they read them through the decode functions below, each of which
//! yields a concrete Rust type or `None` on any shape mismatch.

mod memory;
mod repository;

pub use memory::MemorySettings;
pub use repository::SettingsRepository;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::Result;

/// One settings group: key to dynamic value.
pub type SettingsGroup = HashMap<String, Value>;

/// Bytes per megabyte, as used by all size settings.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Read access to a dynamic settings store.
///
/// A group that has never been written is returned as an empty map.
/// An `Err` means the store itself could not be reached.
#[allow(async_fn_in_trait)]
pub trait SettingsSource {
    /// Fetch every key of the named group.
    async fn get_settings_group(&self, name: &str) -> Result<SettingsGroup>;
}

impl<T: SettingsSource + ?Sized> SettingsSource for &T {
    async fn get_settings_group(&self, name: &str) -> Result<SettingsGroup> {
        (**self).get_settings_group(name).await
    }
}

impl<T: SettingsSource + ?Sized> SettingsSource for Arc<T> {
    async fn get_settings_group(&self, name: &str) -> Result<SettingsGroup> {
        (**self).get_settings_group(name).await
    }
}

/// Decode a size given in megabytes into bytes.
///
/// Accepts integer and floating point numbers. Negative sizes clamp to 0,
/// which callers treat as "unlimited".
pub fn decode_megabytes(value: &Value) -> Option<u64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(mb) = n.as_u64() {
        return Some(mb.saturating_mul(BYTES_PER_MB));
    }
    if n.as_i64().is_some() {
        // Only negative integers reach this point.
        return Some(0);
    }
    let mb = n.as_f64()?;
    if !mb.is_finite() {
        return None;
    }
    // `as` saturates for floats: huge values clamp to u64::MAX, negatives to 0.
    Some((mb * BYTES_PER_MB as f64) as u64)
}

/// Decode a whole number, truncating floating point values.
pub fn decode_integer(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if !f.is_finite() || f < i64::MIN as f64 || f > i64::MAX as f64 {
        return None;
    }
    Some(f.trunc() as i64)
}

/// Decode a list of strings.
///
/// Non-string elements are skipped. A value that is not a list at all
/// yields `None`.
pub fn decode_string_list(value: &Value) -> Option<Vec<String>> {
    let Value::Array(items) = value else {
        return None;
    };
    Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
    )
}
