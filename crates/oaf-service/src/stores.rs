//! Settings and dismissal stores
//!
//! Both sit on a [`StorageArea`]. Settings live in the synced area under
//! exactly two keys; dismissals live in the local area under a fixed key
//! prefix so they can be enumerated and bulk-removed without touching
//! anything else.

use std::sync::Arc;

use serde_json::{json, Value};

use oaf_core::host::normalize_host;
use oaf_core::settings::{Settings, SettingsPatch};

use crate::storage::{StorageArea, StorageError};

const KEY_BANNER_ENABLED: &str = "bannerEnabled";
const KEY_BANNER_MAX_ITEMS: &str = "bannerMaxItems";

/// Key prefix for per-host dismissal records in the local area.
pub const DISMISSED_KEY_PREFIX: &str = "dismissed::";

// =============================================================================
// Settings store
// =============================================================================

/// Persisted global banner settings, merged over defaults on read.
pub struct SettingsStore {
    area: Arc<dyn StorageArea>,
}

impl SettingsStore {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self { area }
    }

    /// Stored values take precedence per key; absent keys fall back to
    /// defaults. No clamping here: values were sanitized when written.
    pub fn get(&self) -> Result<Settings, StorageError> {
        let defaults = Settings::default();
        let banner_enabled = match self.area.get(KEY_BANNER_ENABLED)? {
            Some(Value::Bool(b)) => b,
            _ => defaults.banner_enabled,
        };
        let banner_max_items = match self.area.get(KEY_BANNER_MAX_ITEMS)? {
            Some(Value::Number(n)) => n.as_u64().map(|n| n as u8).unwrap_or(defaults.banner_max_items),
            _ => defaults.banner_max_items,
        };
        Ok(Settings {
            banner_enabled,
            banner_max_items,
        })
    }

    /// Sanitize an incoming patch, persist the full record, return it.
    pub fn set(&self, patch: &SettingsPatch) -> Result<Settings, StorageError> {
        let safe = Settings::sanitize(patch);
        self.area.set(KEY_BANNER_ENABLED, json!(safe.banner_enabled))?;
        self.area.set(KEY_BANNER_MAX_ITEMS, json!(safe.banner_max_items))?;
        Ok(safe)
    }

    /// First-install seeding: write defaults only for keys not yet present.
    pub fn seed_defaults(&self) -> Result<(), StorageError> {
        let defaults = Settings::default();
        if self.area.get(KEY_BANNER_ENABLED)?.is_none() {
            self.area.set(KEY_BANNER_ENABLED, json!(defaults.banner_enabled))?;
        }
        if self.area.get(KEY_BANNER_MAX_ITEMS)?.is_none() {
            self.area.set(KEY_BANNER_MAX_ITEMS, json!(defaults.banner_max_items))?;
        }
        Ok(())
    }
}

// =============================================================================
// Dismissal store
// =============================================================================

/// Per-host "hide the banner here" flags. Presence of a record means
/// dismissed; removal means the banner may show again.
pub struct DismissalStore {
    area: Arc<dyn StorageArea>,
}

impl DismissalStore {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self { area }
    }

    fn key_for(host: &str) -> String {
        format!("{}{}", DISMISSED_KEY_PREFIX, normalize_host(host))
    }

    pub fn is_dismissed(&self, host: &str) -> Result<bool, StorageError> {
        Ok(self.area.get(&Self::key_for(host))?.is_some())
    }

    /// Idempotent: dismissing an already-dismissed host is a no-op.
    pub fn dismiss(&self, host: &str) -> Result<(), StorageError> {
        self.area.set(&Self::key_for(host), json!(true))
    }

    pub fn undismiss(&self, host: &str) -> Result<(), StorageError> {
        self.area.remove(&Self::key_for(host))
    }

    /// Remove every dismissal record; returns the count removed.
    pub fn clear_all(&self) -> Result<usize, StorageError> {
        self.area.remove_prefixed(DISMISSED_KEY_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryArea;

    fn settings_store() -> SettingsStore {
        SettingsStore::new(Arc::new(MemoryArea::new()))
    }

    fn dismissal_store() -> DismissalStore {
        DismissalStore::new(Arc::new(MemoryArea::new()))
    }

    #[test]
    fn test_settings_fresh_store_returns_defaults() {
        let store = settings_store();
        assert_eq!(store.get().unwrap(), Settings::default());
    }

    #[test]
    fn test_settings_set_then_get() {
        let store = settings_store();
        let patch: SettingsPatch =
            serde_json::from_value(json!({ "bannerEnabled": false, "bannerMaxItems": 5 })).unwrap();
        let saved = store.set(&patch).unwrap();
        assert!(!saved.banner_enabled);
        assert_eq!(saved.banner_max_items, 5);
        assert_eq!(store.get().unwrap(), saved);
    }

    #[test]
    fn test_settings_set_sanitizes() {
        let store = settings_store();
        let patch: SettingsPatch =
            serde_json::from_value(json!({ "bannerEnabled": 1, "bannerMaxItems": 99 })).unwrap();
        let saved = store.set(&patch).unwrap();
        assert!(saved.banner_enabled);
        assert_eq!(saved.banner_max_items, 6);
        // Reader trusts the stored value, so it must come back clamped
        assert_eq!(store.get().unwrap().banner_max_items, 6);
    }

    #[test]
    fn test_settings_partial_storage_merges_defaults() {
        let area = Arc::new(MemoryArea::new());
        area.set("bannerEnabled", json!(false)).unwrap();
        let store = SettingsStore::new(area);

        let s = store.get().unwrap();
        assert!(!s.banner_enabled);
        assert_eq!(s.banner_max_items, 3);
    }

    #[test]
    fn test_seed_defaults_only_if_absent() {
        let area = Arc::new(MemoryArea::new());
        area.set("bannerMaxItems", json!(5)).unwrap();
        let store = SettingsStore::new(area);

        store.seed_defaults().unwrap();
        let s = store.get().unwrap();
        // Existing value untouched, missing key seeded
        assert_eq!(s.banner_max_items, 5);
        assert!(s.banner_enabled);
    }

    #[test]
    fn test_dismiss_and_check() {
        let store = dismissal_store();
        assert!(!store.is_dismissed("example.com").unwrap());

        store.dismiss("example.com").unwrap();
        assert!(store.is_dismissed("example.com").unwrap());
        assert!(!store.is_dismissed("other.com").unwrap());
    }

    #[test]
    fn test_dismiss_normalizes_host() {
        let store = dismissal_store();
        store.dismiss("www.Example.com").unwrap();
        assert!(store.is_dismissed("example.com").unwrap());
        assert!(store.is_dismissed("WWW.EXAMPLE.COM").unwrap());
    }

    #[test]
    fn test_undismiss() {
        let store = dismissal_store();
        store.dismiss("example.com").unwrap();
        store.undismiss("example.com").unwrap();
        assert!(!store.is_dismissed("example.com").unwrap());
    }

    #[test]
    fn test_clear_all_counts() {
        let store = dismissal_store();
        assert_eq!(store.clear_all().unwrap(), 0);

        store.dismiss("a.com").unwrap();
        store.dismiss("b.com").unwrap();
        store.dismiss("a.com").unwrap(); // idempotent, still one record

        assert_eq!(store.clear_all().unwrap(), 2);
        assert!(!store.is_dismissed("a.com").unwrap());
        assert!(!store.is_dismissed("b.com").unwrap());
    }
}
