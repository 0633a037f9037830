//! Configuration module for the firmware crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use firmware_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! for vendor in config.enabled_vendors() {
//!     println!("Will crawl {}", vendor.name);
//! }
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, PolitenessConfig, UserAgentConfig, VendorEntry};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
