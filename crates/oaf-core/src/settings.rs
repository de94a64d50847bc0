//! Banner settings and write-time sanitization
//!
//! Settings are a single global record, not per-host. Sanitization happens
//! exactly once, when a write comes in; readers trust the stored values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_MAX_ITEMS: u8 = 3;
pub const MIN_MAX_ITEMS: u8 = 1;
pub const MAX_MAX_ITEMS: u8 = 6;

/// The persisted settings record. Field names are camelCase on the wire to
/// match the extension's storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub banner_enabled: bool,
    pub banner_max_items: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            banner_enabled: true,
            banner_max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

/// An incoming settings write, before sanitization.
///
/// Fields are raw JSON values because the options page historically sent
/// whatever the form produced; coercion rules live here, not in callers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub banner_enabled: Option<Value>,
    #[serde(default)]
    pub banner_max_items: Option<Value>,
}

impl Settings {
    /// Produce the record to persist from an untrusted patch.
    ///
    /// `bannerEnabled` gets JS-style truthiness coercion; an absent field
    /// means disabled, not "keep current" (a full record is always written).
    /// `bannerMaxItems` is coerced to an integer, with non-numeric input
    /// falling back to the default, then clamped to [1, 6].
    pub fn sanitize(patch: &SettingsPatch) -> Settings {
        Settings {
            banner_enabled: patch.banner_enabled.as_ref().is_some_and(truthy),
            banner_max_items: coerce_max_items(patch.banner_max_items.as_ref()),
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn coerce_max_items(value: Option<&Value>) -> u8 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().map(|f| f as i64),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    };
    let n = n.unwrap_or(DEFAULT_MAX_ITEMS as i64);
    n.clamp(MIN_MAX_ITEMS as i64, MAX_MAX_ITEMS as i64) as u8
}
