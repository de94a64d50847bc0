//! Request dispatch and the memoized dataset handle
//!
//! The coordinator is long-lived and stateless between calls: each request is
//! handled independently, and the only shared state is the dataset (read-only
//! after first load) and the durable stores. Every internal failure is
//! converted into the uniform failure response exactly once, here.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use oaf_core::dataset::{Dataset, DatasetError};
use oaf_core::host::normalize_host;
use oaf_core::url::extract_host;

use crate::error::ServiceError;
use crate::protocol::{FoundMapping, Request, Response};
use crate::storage::StorageArea;
use crate::stores::{DismissalStore, SettingsStore};

// =============================================================================
// Dataset source + lazy handle
// =============================================================================

/// Where the raw `mappings.json` bytes come from (bundle file, embedded
/// buffer, test fixture).
pub trait DatasetSource: Send + Sync {
    fn load_bytes(&self) -> Result<Vec<u8>, DatasetError>;
}

/// A source over bytes already in memory.
pub struct BytesSource(pub Vec<u8>);

impl DatasetSource for BytesSource {
    fn load_bytes(&self) -> Result<Vec<u8>, DatasetError> {
        Ok(self.0.clone())
    }
}

/// A source reading a dataset file from disk on demand.
pub struct FileSource {
    path: std::path::PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for FileSource {
    fn load_bytes(&self) -> Result<Vec<u8>, DatasetError> {
        std::fs::read(&self.path).map_err(|e| {
            DatasetError::Unavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// Loads the dataset on first use and serves the same `Arc` afterwards.
///
/// A failed load is never cached: the slot stays empty and the next request
/// re-attempts. Concurrent first loads may both parse; the first writer wins
/// and both callers get the cached copy.
pub struct LazyDataset {
    source: Box<dyn DatasetSource>,
    cached: RwLock<Option<Arc<Dataset>>>,
}

impl LazyDataset {
    pub fn new(source: Box<dyn DatasetSource>) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Result<Arc<Dataset>, DatasetError> {
        if let Some(dataset) = self.cached.read().unwrap().as_ref() {
            return Ok(Arc::clone(dataset));
        }

        let bytes = self.source.load_bytes()?;
        let dataset = Arc::new(Dataset::from_slice(&bytes)?);

        let mut slot = self.cached.write().unwrap();
        match slot.as_ref() {
            Some(existing) => Ok(Arc::clone(existing)),
            None => {
                *slot = Some(Arc::clone(&dataset));
                Ok(dataset)
            }
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// The background message handler.
pub struct Coordinator {
    dataset: LazyDataset,
    settings: SettingsStore,
    dismissals: DismissalStore,
}

impl Coordinator {
    /// `sync_area` holds the settings record, `local_area` the dismissal
    /// flags; they are separate namespaces so bulk dismissal removal cannot
    /// touch settings.
    pub fn new(
        source: Box<dyn DatasetSource>,
        sync_area: Arc<dyn StorageArea>,
        local_area: Arc<dyn StorageArea>,
    ) -> Self {
        Self {
            dataset: LazyDataset::new(source),
            settings: SettingsStore::new(sync_area),
            dismissals: DismissalStore::new(local_area),
        }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn dismissals(&self) -> &DismissalStore {
        &self.dismissals
    }

    /// First-install hook: warm the dataset and seed default settings.
    /// Failures here are logged, not fatal; the first real request retries.
    pub fn on_installed(&self) {
        if let Err(e) = self.dataset.get() {
            log::warn!("dataset warm-up failed: {e}");
        }
        if let Err(e) = self.settings.seed_defaults() {
            log::warn!("settings seeding failed: {e}");
        }
    }

    /// Handle a raw JSON message, tolerating malformed input.
    pub fn handle_value(&self, message: Value) -> Response {
        let tag = match message.get("type").and_then(Value::as_str) {
            Some(tag) => tag.to_string(),
            None => return Response::failure("Missing message type"),
        };

        if !Request::is_known_tag(&tag) {
            return Response::failure("Unknown message type");
        }

        match serde_json::from_value::<Request>(message) {
            Ok(request) => self.handle(request),
            Err(e) => Response::failure(format!("Malformed {tag} request: {e}")),
        }
    }

    /// Handle a typed request. Never panics; never returns partial data on
    /// failure.
    pub fn handle(&self, request: Request) -> Response {
        log::debug!("handling {request:?}");
        let outcome = match request {
            Request::ResolveUrl { url } => self.resolve_url(&url),
            Request::ResolveHost { hostname } => self.resolve_host(&hostname),
            Request::GetSettings => self.get_settings(),
            Request::SetSettings { settings } => self.set_settings(&settings),
        };

        outcome.unwrap_or_else(|e| {
            log::warn!("request failed: {e}");
            Response::from(e)
        })
    }

    fn resolve_url(&self, url: &str) -> Result<Response, ServiceError> {
        let host =
            extract_host(url).ok_or_else(|| ServiceError::invalid_input("Invalid URL"))?;
        let dataset = self.dataset.get()?;
        let found = dataset.resolve(host).map(FoundMapping::from);
        Ok(Response::resolution(normalize_host(host), found))
    }

    fn resolve_host(&self, hostname: &str) -> Result<Response, ServiceError> {
        let dataset = self.dataset.get()?;
        let found = dataset.resolve(hostname).map(FoundMapping::from);
        let settings = self.settings.get()?;
        Ok(Response::resolution_with_settings(
            normalize_host(hostname),
            found,
            settings,
        ))
    }

    fn get_settings(&self) -> Result<Response, ServiceError> {
        Ok(Response::settings(self.settings.get()?))
    }

    fn set_settings(
        &self,
        patch: &oaf_core::settings::SettingsPatch,
    ) -> Result<Response, ServiceError> {
        Ok(Response::settings(self.settings.set(patch)?))
    }
}
