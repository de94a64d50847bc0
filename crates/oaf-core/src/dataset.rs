//! Dataset model, resolver, search and lint
//!
//! The dataset is a JSON object mapping normalized domains to product
//! entries. It is parsed once per process and read-only afterwards, so
//! concurrent readers need no locking.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::host::{normalize_host, parent_fallback};

/// Error type for dataset loading.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to parse mappings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to load mappings: {0}")]
    Unavailable(String),
}

/// One open-source alternative to a proprietary product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A proprietary product and its alternatives, keyed by domain in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

/// A dataset entry found for a hostname, with the key it matched under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub key: &'a str,
    pub entry: &'a MappingEntry,
}

/// A search result: the dataset entry plus the domain it is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit<'a> {
    pub domain: &'a str,
    pub entry: &'a MappingEntry,
}

/// The static domain → entry table, immutable once loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    entries: HashMap<String, MappingEntry>,
}

impl Dataset {
    /// Parse a dataset from raw JSON bytes (the `data/mappings.json` shape).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DatasetError> {
        let dataset: Dataset = serde_json::from_slice(bytes)?;
        log::debug!("loaded dataset with {} domains", dataset.len());
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&MappingEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert an entry under an already-normalized key. Test and tooling use.
    pub fn insert(&mut self, key: impl Into<String>, entry: MappingEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Find the best-matching entry for a hostname.
    ///
    /// Exact match on the normalized host first; otherwise, for hosts with
    /// three or more labels, one fallback probe on the last two labels. Hosts
    /// the dataset does not cover return `None`.
    pub fn resolve(&self, hostname: &str) -> Option<Resolved<'_>> {
        let host = normalize_host(hostname);

        if let Some((key, entry)) = self.entries.get_key_value(host.as_str()) {
            return Some(Resolved { key, entry });
        }

        // One-step parent fallback: a.b.example.com -> example.com
        if let Some(parent) = parent_fallback(&host) {
            if let Some((key, entry)) = self.entries.get_key_value(parent.as_str()) {
                return Some(Resolved { key, entry });
            }
        }

        None
    }

    /// Case-insensitive substring search over domains, product names,
    /// categories and alternative names. No relevance ranking: results come
    /// back in dataset iteration order, capped at `limit`.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit<'_>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (domain, entry) in self.iter() {
            if hits.len() >= limit {
                break;
            }

            let haystack = format!(
                "{} {} {}",
                domain,
                entry.name,
                entry.category.as_deref().unwrap_or("")
            )
            .to_lowercase();

            let matched = haystack.contains(&query)
                || entry
                    .alternatives
                    .iter()
                    .any(|a| a.name.to_lowercase().contains(&query));

            if matched {
                hits.push(SearchHit { domain, entry });
            }
        }
        hits
    }

    /// Check the dataset against its own invariants. Returned issues are
    /// advisory: the resolver tolerates all of them, but non-normalized keys
    /// are unreachable by lookup.
    pub fn lint(&self) -> Vec<LintIssue> {
        let mut issues = Vec::new();

        for (domain, entry) in self.iter() {
            if normalize_host(domain) != domain {
                issues.push(LintIssue::new(domain, LintKind::UnnormalizedKey));
            }
            if entry.name.trim().is_empty() {
                issues.push(LintIssue::new(domain, LintKind::EmptyProductName));
            }
            if entry.alternatives.is_empty() {
                issues.push(LintIssue::new(domain, LintKind::NoAlternatives));
            }
            for alt in &entry.alternatives {
                if !crate::url::is_web_url(&alt.url) {
                    issues.push(LintIssue::new(domain, LintKind::BadAlternativeUrl(alt.url.clone())));
                }
            }
        }

        issues
    }
}

/// A single problem found by [`Dataset::lint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    pub domain: String,
    pub kind: LintKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintKind {
    /// Key differs from its normalized form, so no lookup can ever reach it.
    UnnormalizedKey,
    EmptyProductName,
    /// Entry exists but lists nothing to suggest.
    NoAlternatives,
    BadAlternativeUrl(String),
}

impl LintIssue {
    fn new(domain: &str, kind: LintKind) -> Self {
        Self {
            domain: domain.to_string(),
            kind,
        }
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LintKind::UnnormalizedKey => {
                write!(f, "{}: key is not in normalized form", self.domain)
            }
            LintKind::EmptyProductName => write!(f, "{}: empty product name", self.domain),
            LintKind::NoAlternatives => write!(f, "{}: no alternatives listed", self.domain),
            LintKind::BadAlternativeUrl(url) => {
                write!(f, "{}: alternative URL is not http(s): {}", self.domain, url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> MappingEntry {
        MappingEntry {
            name: name.to_string(),
            category: None,
            alternatives: vec![Alternative {
                name: format!("lib{}", name),
                url: "https://github.com/example/lib".to_string(),
                tags: vec!["self-hosted".to_string()],
                notes: None,
            }],
        }
    }

    fn sample() -> Dataset {
        let mut ds = Dataset::default();
        ds.insert("example.com", entry("Example"));
        ds.insert("photoshop.com", entry("Photoshop"));
        ds
    }

    #[test]
    fn test_from_slice() {
        let json = br#"{
            "example.com": {
                "name": "Example",
                "category": "Design",
                "alternatives": [
                    { "name": "GIMP", "url": "https://www.gimp.org", "tags": ["raster"] }
                ]
            }
        }"#;
        let ds = Dataset::from_slice(json).unwrap();
        assert_eq!(ds.len(), 1);
        let e = ds.get("example.com").unwrap();
        assert_eq!(e.name, "Example");
        assert_eq!(e.category.as_deref(), Some("Design"));
        assert_eq!(e.alternatives[0].tags, vec!["raster"]);
        assert_eq!(e.alternatives[0].notes, None);
    }

    #[test]
    fn test_from_slice_minimal_entry() {
        // category and alternatives may be absent entirely
        let ds = Dataset::from_slice(br#"{"example.com": {"name": "Example"}}"#).unwrap();
        let e = ds.get("example.com").unwrap();
        assert_eq!(e.category, None);
        assert!(e.alternatives.is_empty());
    }

    #[test]
    fn test_from_slice_parse_error() {
        assert!(matches!(
            Dataset::from_slice(b"not json"),
            Err(DatasetError::Parse(_))
        ));
    }

    #[test]
    fn test_resolve_exact() {
        let ds = sample();
        let r = ds.resolve("example.com").unwrap();
        assert_eq!(r.key, "example.com");
        assert_eq!(r.entry.name, "Example");
    }

    #[test]
    fn test_resolve_normalizes_query() {
        let ds = sample();
        let direct = ds.resolve("example.com").unwrap();
        let www = ds.resolve("www.Example.com").unwrap();
        assert_eq!(www.key, direct.key);
        assert_eq!(www.entry, direct.entry);
    }

    #[test]
    fn test_resolve_parent_fallback() {
        let ds = sample();
        let r = ds.resolve("mail.example.com").unwrap();
        assert_eq!(r.key, "example.com");
        // Deep subdomains still fall back only one level, to the last two labels
        let r = ds.resolve("a.b.example.com").unwrap();
        assert_eq!(r.key, "example.com");
    }

    #[test]
    fn test_resolve_miss() {
        let ds = sample();
        assert!(ds.resolve("unknown.org").is_none());
        assert!(ds.resolve("sub.unknown.org").is_none());
        // Two-label host gets no fallback probe
        assert!(ds.resolve("example.org").is_none());
    }

    #[test]
    fn test_resolve_prefers_exact_over_fallback() {
        let mut ds = sample();
        ds.insert("mail.example.com", entry("Example Mail"));
        let r = ds.resolve("mail.example.com").unwrap();
        assert_eq!(r.key, "mail.example.com");
        assert_eq!(r.entry.name, "Example Mail");
    }

    #[test]
    fn test_search_containment() {
        let ds = sample();
        let hits = ds.search("photo", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].domain, "photoshop.com");

        // Alternative names are searched too
        let hits = ds.search("libexample", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].domain, "example.com");
    }

    #[test]
    fn test_search_blank_query() {
        let ds = sample();
        assert!(ds.search("", 10).is_empty());
        assert!(ds.search("   ", 10).is_empty());
    }

    #[test]
    fn test_search_limit() {
        let mut ds = Dataset::default();
        for i in 0..20 {
            ds.insert(format!("site{}.com", i), entry("Product"));
        }
        assert_eq!(ds.search("product", 10).len(), 10);
    }

    #[test]
    fn test_lint_clean() {
        assert!(sample().lint().is_empty());
    }

    #[test]
    fn test_lint_flags_problems() {
        let mut ds = Dataset::default();
        ds.insert("www.example.com", entry("Example"));
        ds.insert(
            "empty.com",
            MappingEntry {
                name: "  ".to_string(),
                category: None,
                alternatives: vec![],
            },
        );
        ds.insert(
            "badurl.com",
            MappingEntry {
                name: "Bad".to_string(),
                category: None,
                alternatives: vec![Alternative {
                    name: "alt".to_string(),
                    url: "ftp://example.org".to_string(),
                    tags: vec![],
                    notes: None,
                }],
            },
        );

        let issues = ds.lint();
        assert!(issues
            .iter()
            .any(|i| i.domain == "www.example.com" && i.kind == LintKind::UnnormalizedKey));
        assert!(issues
            .iter()
            .any(|i| i.domain == "empty.com" && i.kind == LintKind::EmptyProductName));
        assert!(issues
            .iter()
            .any(|i| i.domain == "empty.com" && i.kind == LintKind::NoAlternatives));
        assert!(issues
            .iter()
            .any(|i| matches!(&i.kind, LintKind::BadAlternativeUrl(u) if u.starts_with("ftp"))));
    }
}
