use serde::Deserialize;

use crate::crawler::{Politeness, PolitenessOverrides};

/// Main configuration structure for the firmware crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "vendor")]
    pub vendors: Vec<VendorEntry>,
}

impl Config {
    /// Vendor entries that are switched on, in file order
    pub fn enabled_vendors(&self) -> impl Iterator<Item = &VendorEntry> {
        self.vendors.iter().filter(|v| v.enabled)
    }

    pub fn vendor(&self, name: &str) -> Option<&VendorEntry> {
        self.vendors.iter().find(|v| v.name == name)
    }
}

/// Global politeness settings, the base every vendor run starts from
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolitenessConfig {
    /// Maximum number of requests in flight per vendor run
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Minimum time between dispatches of the same transport class (milliseconds)
    #[serde(default = "default_download_delay_ms")]
    pub download_delay_ms: u64,

    #[serde(default)]
    pub jitter_min_ms: u64,

    #[serde(default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,

    #[serde(default = "default_obey_robots")]
    pub obey_robots: bool,
}

fn default_concurrent_requests() -> usize {
    1
}

fn default_download_delay_ms() -> u64 {
    750
}

fn default_jitter_max_ms() -> u64 {
    375
}

fn default_obey_robots() -> bool {
    true
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: default_concurrent_requests(),
            download_delay_ms: default_download_delay_ms(),
            jitter_min_ms: 0,
            jitter_max_ms: default_jitter_max_ms(),
            obey_robots: default_obey_robots(),
        }
    }
}

impl PolitenessConfig {
    pub fn to_politeness(&self) -> Politeness {
        PolitenessOverrides {
            concurrent_requests: Some(self.concurrent_requests),
            download_delay_ms: Some(self.download_delay_ms),
            jitter_min_ms: Some(self.jitter_min_ms),
            jitter_max_ms: Some(self.jitter_max_ms),
            obey_robots: Some(self.obey_robots),
        }
        .apply(&Politeness::default())
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the token matched against robots.txt groups
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON-lines file records are appended to
    #[serde(rename = "records-path")]
    pub records_path: String,
}

/// One `[[vendor]]` entry
///
/// Any politeness field set here wins over both the global table and the
/// vendor module's own defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VendorEntry {
    pub name: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub concurrent_requests: Option<usize>,
    pub download_delay_ms: Option<u64>,
    pub jitter_min_ms: Option<u64>,
    pub jitter_max_ms: Option<u64>,
    pub obey_robots: Option<bool>,
}

fn default_enabled() -> bool {
    true
}

impl VendorEntry {
    pub fn overrides(&self) -> PolitenessOverrides {
        PolitenessOverrides {
            concurrent_requests: self.concurrent_requests,
            download_delay_ms: self.download_delay_ms,
            jitter_min_ms: self.jitter_min_ms,
            jitter_max_ms: self.jitter_max_ms,
            obey_robots: self.obey_robots,
        }
    }
}
