//! On-disk stand-ins for the browser's storage areas
//!
//! Settings and dismissals get one JSON file each under the state directory,
//! mirroring the synced/local split so a bulk dismissal wipe can never touch
//! settings.

use std::path::Path;
use std::sync::Arc;

use oaf_service::storage::{JsonFileArea, StorageArea};

pub struct StateAreas {
    /// Settings record (two keys, synced in the browser).
    pub sync: Arc<dyn StorageArea>,
    /// Dismissal flags (per-host, local in the browser).
    pub local: Arc<dyn StorageArea>,
}

impl StateAreas {
    pub fn open(state_dir: &Path) -> Self {
        Self {
            sync: Arc::new(JsonFileArea::new(state_dir.join("settings.json"))),
            local: Arc::new(JsonFileArea::new(state_dir.join("dismissals.json"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oaf_service::stores::{DismissalStore, SettingsStore};

    #[test]
    fn test_state_areas_are_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let areas = StateAreas::open(dir.path());

        let settings = SettingsStore::new(areas.sync);
        let dismissals = DismissalStore::new(areas.local);

        settings.seed_defaults().unwrap();
        dismissals.dismiss("example.com").unwrap();

        // Clearing dismissals leaves the settings record alone
        assert_eq!(dismissals.clear_all().unwrap(), 1);
        assert_eq!(settings.get().unwrap(), Default::default());

        assert!(dir.path().join("settings.json").exists());
        assert!(dir.path().join("dismissals.json").exists());
    }
}
