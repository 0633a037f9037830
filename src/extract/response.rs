use std::borrow::Cow;

use serde::de::DeserializeOwned;

use crate::crawler::{FetchedPage, TransportFailure};
use crate::extract::Context;
use crate::url::join_url;

/// Status of a completed traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Status code reported by the server
    Code(u16),

    /// The fetch never produced a server response
    Failed(TransportFailure),
}

impl ResponseStatus {
    /// Returns true for a 2xx code
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Code(code) if (200..300).contains(code))
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Failed(failure) => write!(f, "failed ({})", failure),
        }
    }
}

/// Result of fetching one traversal request, as seen by a step
#[derive(Debug, Clone)]
pub struct TraversalResponse {
    pub status: ResponseStatus,
    pub body: Vec<u8>,
    /// Final location after redirects; the request target on failure
    pub url: String,
    pub context: Context,
}

impl TraversalResponse {
    /// Wraps a fetch result, turning a transport failure into the failed status
    pub fn from_fetch(
        result: Result<FetchedPage, TransportFailure>,
        target: &str,
        context: Context,
    ) -> Self {
        match result {
            Ok(page) => Self {
                status: ResponseStatus::Code(page.status),
                body: page.body,
                url: page.final_url,
                context,
            },
            Err(failure) => Self {
                status: ResponseStatus::Failed(failure),
                body: Vec::new(),
                url: target.to_string(),
                context,
            },
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body decoded as ISO-8859-1
    pub fn latin1(&self) -> String {
        self.body.iter().map(|&b| b as char).collect()
    }

    /// Body deserialized as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Resolves a link relative to the response location
    pub fn urljoin(&self, link: &str) -> Option<String> {
        join_url(&self.url, link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &[u8]) -> TraversalResponse {
        TraversalResponse::from_fetch(
            Ok(FetchedPage {
                status: 200,
                body: body.to_vec(),
                final_url: "https://example.com/de/products/".to_string(),
            }),
            "https://example.com/de/products",
            Context::new(),
        )
    }

    #[test]
    fn test_status_success_range() {
        assert!(ResponseStatus::Code(200).is_success());
        assert!(ResponseStatus::Code(204).is_success());
        assert!(!ResponseStatus::Code(301).is_success());
        assert!(!ResponseStatus::Code(404).is_success());
        assert!(!ResponseStatus::Failed(TransportFailure::Timeout).is_success());
    }

    #[test]
    fn test_failure_becomes_failed_status() {
        let resp = TraversalResponse::from_fetch(
            Err(TransportFailure::Connect("refused".to_string())),
            "ftp://ftp.example.com/",
            Context::new().with("k", "v"),
        );
        assert!(resp.status.is_failed());
        assert_eq!(resp.status.code(), None);
        assert!(resp.body.is_empty());
        assert_eq!(resp.url, "ftp://ftp.example.com/");
        assert_eq!(resp.context.get_str("k"), Some("v"));
    }

    #[test]
    fn test_final_url_is_used() {
        let resp = response(b"");
        assert_eq!(resp.url, "https://example.com/de/products/");
        assert_eq!(resp.status, ResponseStatus::Code(200));
    }

    #[test]
    fn test_latin1_decoding() {
        let resp = response(b"Release-Datum: 01.02.2024\nProdukt: FRITZ!Box 7590 \xdcbersicht");
        assert!(resp.latin1().ends_with("\u{dc}bersicht"));
        assert!(resp.text().contains('\u{fffd}'));
    }

    #[test]
    fn test_json() {
        let resp = response(br#"{"Result": {"Count": 2}}"#);
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["Result"]["Count"], 2);

        let bad = response(b"<html>");
        assert!(bad.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_urljoin_uses_final_location() {
        let resp = response(b"");
        assert_eq!(
            resp.urljoin("dir-842/").as_deref(),
            Some("https://example.com/de/products/dir-842/")
        );
        assert_eq!(
            resp.urljoin("?revision=B1").as_deref(),
            Some("https://example.com/de/products/?revision=B1")
        );
    }
}
