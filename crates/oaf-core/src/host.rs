//! Hostname normalization
//!
//! Dataset keys are stored in canonical form: lowercase, no leading "www.".
//! Every lookup must run the query through the same normalization or exact
//! matches are missed.

/// Reduce a hostname to its canonical comparison key.
///
/// Lowercases the input and strips exactly one leading `"www."`. Empty input
/// yields an empty string. Total function: no error conditions.
///
/// Idempotent for real hostnames. A host nested under a literal `www.www.`
/// keeps the inner prefix, so renormalizing strips again; dataset keys never
/// carry a `www.` label, making the corner unreachable by lookup.
///
/// # Examples
///
/// ```
/// use oaf_core::host::normalize_host;
///
/// assert_eq!(normalize_host("www.Example.com"), "example.com");
/// assert_eq!(normalize_host("mail.example.com"), "mail.example.com");
/// ```
pub fn normalize_host(hostname: &str) -> String {
    let lower = hostname.to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Last two labels of a normalized host, when it has three or more.
///
/// This is the one-level parent-domain fallback: `a.b.example.com` maps to
/// `example.com` so the dataset does not have to enumerate every subdomain.
/// Deliberately not public-suffix aware; a host under a two-label public
/// suffix can fall back to an unrelated key. The dataset's expected shape
/// assumes this heuristic, so it must not be silently upgraded.
pub fn parent_fallback(normalized: &str) -> Option<String> {
    let labels: Vec<&str> = normalized.split('.').collect();
    if labels.len() >= 3 {
        Some(labels[labels.len() - 2..].join("."))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize_host("EXAMPLE.COM"), "example.com");
        assert_eq!(normalize_host("Sub.Example.Com"), "sub.example.com");
    }

    #[test]
    fn test_normalize_strips_single_www() {
        assert_eq!(normalize_host("www.example.com"), "example.com");
        // Only one occurrence, only at the start
        assert_eq!(normalize_host("www.www.example.com"), "www.example.com");
        assert_eq!(normalize_host("notwww.example.com"), "notwww.example.com");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_host(""), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for h in ["www.Example.com", "EXAMPLE.COM", "", "x", "mail.example.co.uk"] {
            let once = normalize_host(h);
            assert_eq!(normalize_host(&once), once);
        }
    }

    #[test]
    fn test_normalize_nested_www_strips_once_per_pass() {
        // The accepted corner: one strip per call, so a doubled prefix
        // renormalizes further. Dataset keys never carry a www label.
        let once = normalize_host("WWW.WWW.a.b");
        assert_eq!(once, "www.a.b");
        assert_eq!(normalize_host(&once), "a.b");
    }

    #[test]
    fn test_parent_fallback() {
        assert_eq!(parent_fallback("a.b.example.com"), Some("example.com".to_string()));
        assert_eq!(parent_fallback("mail.example.com"), Some("example.com".to_string()));
        assert_eq!(parent_fallback("example.com"), None);
        assert_eq!(parent_fallback("localhost"), None);
    }
}
