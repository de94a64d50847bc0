//! Message protocol
//!
//! The wire tags and response shapes match what the extension's content
//! script, popup and options page already send over `chrome.runtime`
//! messaging. Every response carries an `ok` flag; failures carry a
//! human-readable message and no partial data.

use serde::{Deserialize, Serialize};

use oaf_core::dataset::{Alternative, Resolved};
use oaf_core::settings::{Settings, SettingsPatch};

use crate::error::ServiceError;

pub const TAG_RESOLVE_URL: &str = "GET_ALTERNATIVES_FOR_URL";
pub const TAG_RESOLVE_HOST: &str = "GET_ALTERNATIVES_FOR_HOST";
pub const TAG_GET_SETTINGS: &str = "GET_SETTINGS";
pub const TAG_SET_SETTINGS: &str = "SET_SETTINGS";

/// An incoming request, dispatched on its `type` tag.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Resolve the hostname of a full page URL.
    #[serde(rename = "GET_ALTERNATIVES_FOR_URL")]
    ResolveUrl { url: String },

    /// Resolve a bare hostname; the response also carries settings so the
    /// banner can decide whether and how much to render in one round trip.
    #[serde(rename = "GET_ALTERNATIVES_FOR_HOST")]
    ResolveHost {
        #[serde(default)]
        hostname: String,
    },

    #[serde(rename = "GET_SETTINGS")]
    GetSettings,

    #[serde(rename = "SET_SETTINGS")]
    SetSettings {
        #[serde(default)]
        settings: SettingsPatch,
    },
}

impl Request {
    pub fn is_known_tag(tag: &str) -> bool {
        matches!(
            tag,
            TAG_RESOLVE_URL | TAG_RESOLVE_HOST | TAG_GET_SETTINGS | TAG_SET_SETTINGS
        )
    }
}

/// The dataset entry a resolution found, flattened with the key it matched
/// under. `category` is omitted when absent, like the original object spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundMapping {
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub alternatives: Vec<Alternative>,
}

impl From<Resolved<'_>> for FoundMapping {
    fn from(r: Resolved<'_>) -> Self {
        Self {
            key: r.key.to_string(),
            name: r.entry.name.clone(),
            category: r.entry.category.clone(),
            alternatives: r.entry.alternatives.clone(),
        }
    }
}

/// A response to any request. Success variants always set `ok: true`;
/// the failure variant always sets `ok: false`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Resolution {
        ok: bool,
        hostname: String,
        found: Option<FoundMapping>,
    },
    ResolutionWithSettings {
        ok: bool,
        hostname: String,
        found: Option<FoundMapping>,
        settings: Settings,
    },
    Settings { ok: bool, settings: Settings },
    Failure { ok: bool, error: String },
}

impl Response {
    pub fn resolution(hostname: String, found: Option<FoundMapping>) -> Self {
        Self::Resolution {
            ok: true,
            hostname,
            found,
        }
    }

    pub fn resolution_with_settings(
        hostname: String,
        found: Option<FoundMapping>,
        settings: Settings,
    ) -> Self {
        Self::ResolutionWithSettings {
            ok: true,
            hostname,
            found,
            settings,
        }
    }

    pub fn settings(settings: Settings) -> Self {
        Self::Settings { ok: true, settings }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            ok: false,
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failure { .. })
    }
}

impl From<ServiceError> for Response {
    fn from(err: ServiceError) -> Self {
        Self::failure(err.to_string())
    }
}
