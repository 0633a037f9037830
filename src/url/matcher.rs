/// Checks if a host matches a domain pattern
///
/// Two kinds of patterns are supported:
/// 1. Exact match: "avm.de" matches only "avm.de"
/// 2. Wildcard match: "*.asus.com" matches "asus.com" and any subdomain of it
///
/// # Examples
///
/// ```
/// use firmware_crawler::url::matches_wildcard;
///
/// assert!(matches_wildcard("avm.de", "avm.de"));
/// assert!(!matches_wildcard("avm.de", "ftp.avm.de"));
/// assert!(matches_wildcard("*.asus.com", "rog.asus.com"));
/// assert!(!matches_wildcard("*.asus.com", "asus.com.evil.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Checks a host against a vendor's allowed-domain list
///
/// An empty list allows every host.
pub fn is_allowed_host(patterns: &[String], host: &str) -> bool {
    patterns.is_empty() || patterns.iter().any(|p| matches_wildcard(p, host))
}
