//! firmware-crawler: latest-firmware discovery across vendor sites
//!
//! This crate implements a polite crawl-and-extract engine. Vendor modules
//! describe how to walk a vendor's web surface (seeds plus a table of
//! extraction steps); the engine drives the traversal with deduplication,
//! bounded concurrency and paced dispatch, normalizes the metadata each
//! terminal step produces, and hands validated firmware records to a sink.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod record;
pub mod robots;
pub mod sink;
pub mod state;
pub mod url;
pub mod vendors;

use thiserror::Error;

/// Main error type for crawler setup and I/O
///
/// Nothing that happens to a single request or record inside a crawl run
/// surfaces here; those are logged and dropped by the engine.
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("Unknown vendor module: {0}")]
    UnknownVendor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlSummary, Engine, Fetcher, HttpFetcher, Politeness};
pub use extract::{Context, TraversalOutcome, TraversalRequest, TraversalResponse, VendorModule};
pub use record::{normalize, FirmwareRecord, RawMetadata, RejectionReason};
pub use sink::RecordSink;
