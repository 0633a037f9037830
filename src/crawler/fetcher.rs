//! Fetch client
//!
//! The engine talks to the network only through the [`Fetcher`] trait. The
//! bundled [`HttpFetcher`] covers HTTP(S); FTP listings and files are served
//! by whatever `Fetcher` the caller plugs in.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use thiserror::Error;

use crate::config::UserAgentConfig;

/// A server response, before any step looks at it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Status code as reported by the server
    pub status: u16,
    pub body: Vec<u8>,
    /// Location after redirects
    pub final_url: String,
}

/// A fetch that never produced a server response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("request timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("{0}")]
    Other(String),
}

/// Performs a single fetch of a target location
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, target: &str) -> Result<FetchedPage, TransportFailure>;
}

/// Formats the user agent header value
///
/// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use firmware_crawler::config::UserAgentConfig;
/// use firmware_crawler::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "FirmwareCrawler".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP(S) fetch client backed by `reqwest`
///
/// Any status code is returned as a page; deciding what a 404 means is up to
/// the step. Targets with another scheme fail with
/// [`TransportFailure::UnsupportedScheme`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &str) -> Result<FetchedPage, TransportFailure> {
        let scheme = target.split_once("://").map(|(s, _)| s.to_ascii_lowercase());
        match scheme.as_deref() {
            Some("http") | Some("https") => {}
            Some(other) => return Err(TransportFailure::UnsupportedScheme(other.to_string())),
            None => return Err(TransportFailure::Other(format!("not a URL: {}", target))),
        }

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.bytes().await.map_err(classify_error)?;

        Ok(FetchedPage {
            status,
            body: body.to_vec(),
            final_url,
        })
    }
}

fn classify_error(e: reqwest::Error) -> TransportFailure {
    if e.is_timeout() {
        TransportFailure::Timeout
    } else if e.is_connect() {
        TransportFailure::Connect(e.to_string())
    } else {
        TransportFailure::Other(e.to_string())
    }
}
