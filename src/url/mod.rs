//! URL handling module
//!
//! This module provides URL helpers the engine and extractors share:
//! transport classification, relative link resolution, canonical dedup keys,
//! host extraction and allowed-domain matching.

mod domain;
mod matcher;
mod normalize;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use domain::extract_host;
pub use matcher::{is_allowed_host, matches_wildcard};
pub use normalize::canonical_url;

/// Transport class a target is fetched through
///
/// Pacing is tracked independently per class, since HTTP and FTP targets
/// are served by separate connection pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportClass {
    Http,
    Ftp,
}

impl TransportClass {
    /// Returns the class for a URL scheme, if the scheme is crawlable
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "http" | "https" => Some(Self::Http),
            "ftp" | "ftps" => Some(Self::Ftp),
            _ => None,
        }
    }

    /// Returns a short label for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Ftp => "ftp",
        }
    }
}

/// Classifies a target location by transport
///
/// # Examples
///
/// ```
/// use firmware_crawler::url::{classify_transport, TransportClass};
///
/// assert_eq!(classify_transport("https://example.com/").unwrap(), TransportClass::Http);
/// assert_eq!(classify_transport("ftp://ftp.example.com/pub/").unwrap(), TransportClass::Ftp);
/// assert!(classify_transport("mailto:admin@example.com").is_err());
/// ```
pub fn classify_transport(target: &str) -> Result<TransportClass, UrlError> {
    let url = Url::parse(target).map_err(|e| UrlError::Parse(e.to_string()))?;
    TransportClass::from_scheme(url.scheme())
        .ok_or_else(|| UrlError::InvalidScheme(url.scheme().to_string()))
}

/// Resolves a possibly relative link against a base location
///
/// Returns None when the base is not an absolute URL or the link cannot be
/// joined onto it.
pub fn join_url(base: &str, link: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(link.trim()).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_http_and_https() {
        assert_eq!(
            classify_transport("http://example.com/").unwrap(),
            TransportClass::Http
        );
        assert_eq!(
            classify_transport("https://example.com/a?b=c").unwrap(),
            TransportClass::Http
        );
    }

    #[test]
    fn test_classify_ftp() {
        assert_eq!(
            classify_transport("ftp://ftp.avm.de/fritzbox/").unwrap(),
            TransportClass::Ftp
        );
    }

    #[test]
    fn test_classify_rejects_other_schemes() {
        assert!(matches!(
            classify_transport("file:///etc/passwd"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(
            classify_transport("not a url"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_join_relative_link() {
        assert_eq!(
            join_url("https://example.com/de/products/", "router-x/").as_deref(),
            Some("https://example.com/de/products/router-x/")
        );
        assert_eq!(
            join_url("https://example.com/de/products/", "/support?id=3").as_deref(),
            Some("https://example.com/support?id=3")
        );
    }

    #[test]
    fn test_join_absolute_link_replaces_base() {
        assert_eq!(
            join_url("https://example.com/", "https://cdn.example.org/fw.bin").as_deref(),
            Some("https://cdn.example.org/fw.bin")
        );
    }

    #[test]
    fn test_join_with_invalid_base() {
        assert!(join_url("relative/only", "x").is_none());
    }
}
