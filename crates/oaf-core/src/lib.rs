//! OSS Alternative Finder Core Library
//!
//! This crate provides the lookup engine behind the OSS Alternative Finder
//! browser extension: it maps the hostname of the page a user is viewing to a
//! curated set of open-source alternatives for the proprietary product served
//! from that host.
//!
//! # Architecture
//!
//! The engine operates on a static JSON dataset (`data/mappings.json` in the
//! extension bundle) that is parsed once and read-only thereafter. Lookups
//! are a handful of string operations: normalize the host, try an exact key,
//! then fall back one level to the registrable parent.
//!
//! # Modules
//!
//! - `host`: hostname normalization
//! - `url`: slice-based host extraction from URLs
//! - `dataset`: dataset model, resolver, search and lint
//! - `settings`: banner settings and write-time sanitization

pub mod dataset;
pub mod host;
pub mod settings;
pub mod url;

// Re-export commonly used types
pub use dataset::{Alternative, Dataset, DatasetError, MappingEntry, Resolved};
pub use host::normalize_host;
pub use settings::{Settings, SettingsPatch};
pub use url::extract_host;
