use chrono::{DateTime, Duration, Utc};

use crate::robots::ParsedRobots;

/// How long fetched rules stay valid
pub const ROBOTS_TTL_HOURS: i64 = 24;

/// Robots rules for one host along with when they were fetched
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub rules: ParsedRobots,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(rules: ParsedRobots) -> Self {
        Self {
            rules,
            fetched_at: Utc::now(),
        }
    }

    /// True once the rules are older than the TTL
    pub fn is_stale(&self) -> bool {
        self.age() > Duration::hours(ROBOTS_TTL_HOURS)
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        self.rules.is_allowed(url, agent)
    }
}
