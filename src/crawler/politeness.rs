use std::time::Duration;

/// How gently a crawl run treats the vendor's servers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Politeness {
    /// Maximum number of requests in flight at once
    pub concurrent_requests: usize,

    /// Minimum time between two dispatches of the same transport class
    pub download_delay: Duration,

    /// Lower bound of the random extra delay added to each interval
    pub jitter_min: Duration,

    /// Upper bound of the random extra delay added to each interval
    pub jitter_max: Duration,

    /// Whether HTTP targets are checked against the host's robots.txt
    pub obey_robots: bool,
}

impl Default for Politeness {
    fn default() -> Self {
        Self {
            concurrent_requests: 1,
            download_delay: Duration::from_millis(750),
            jitter_min: Duration::ZERO,
            jitter_max: Duration::from_millis(375),
            obey_robots: true,
        }
    }
}

/// Partial politeness settings layered over a base [`Politeness`]
///
/// Vendor modules declare these as their defaults, and config entries may
/// declare them again to win over the module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolitenessOverrides {
    pub concurrent_requests: Option<usize>,
    pub download_delay_ms: Option<u64>,
    pub jitter_min_ms: Option<u64>,
    pub jitter_max_ms: Option<u64>,
    pub obey_robots: Option<bool>,
}

impl PolitenessOverrides {
    pub fn obey_robots(mut self, obey: bool) -> Self {
        self.obey_robots = Some(obey);
        self
    }

    pub fn concurrent_requests(mut self, n: usize) -> Self {
        self.concurrent_requests = Some(n);
        self
    }

    pub fn download_delay_ms(mut self, ms: u64) -> Self {
        self.download_delay_ms = Some(ms);
        self
    }

    /// Returns `base` with every field set here replaced
    pub fn apply(&self, base: &Politeness) -> Politeness {
        Politeness {
            concurrent_requests: self.concurrent_requests.unwrap_or(base.concurrent_requests),
            download_delay: self
                .download_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(base.download_delay),
            jitter_min: self
                .jitter_min_ms
                .map(Duration::from_millis)
                .unwrap_or(base.jitter_min),
            jitter_max: self
                .jitter_max_ms
                .map(Duration::from_millis)
                .unwrap_or(base.jitter_max),
            obey_robots: self.obey_robots.unwrap_or(base.obey_robots),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
