//! OSS Alternative Finder background service
//!
//! This crate is the Rust rendition of the extension's background service
//! worker: it owns the lazily-loaded dataset, the persisted settings and
//! per-host dismissal records, and the request/response protocol the
//! presentation layers (banner, popup, options page) speak.
//!
//! # Modules
//!
//! - `storage`: the durable key-value abstraction and its backends
//! - `stores`: settings and dismissal stores on top of a storage area
//! - `protocol`: the message types and their wire shapes
//! - `coordinator`: request dispatch and the memoized dataset handle
//! - `error`: the service-level error taxonomy

pub mod coordinator;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod stores;

pub use coordinator::{BytesSource, Coordinator, DatasetSource, FileSource, LazyDataset};
pub use error::ServiceError;
pub use protocol::{FoundMapping, Request, Response};
pub use storage::{JsonFileArea, MemoryArea, StorageArea, StorageError};
pub use stores::{DismissalStore, SettingsStore};
