//! Robots.txt handling module
//!
//! [`RobotsGuard`] fetches robots.txt once per origin through the crawl's own
//! fetch client and pacer, caches it, and answers whether a target may be
//! fetched. Only HTTP(S) targets are ever checked.

mod cache;
mod parser;

pub use cache::{CachedRobots, ROBOTS_TTL_HOURS};
pub use parser::ParsedRobots;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use url::Url;

use crate::crawler::{Fetcher, Pacer};
use crate::url::TransportClass;

type Slot = Arc<Mutex<Option<CachedRobots>>>;

/// Per-origin robots.txt cache in front of the fetch client
pub struct RobotsGuard {
    fetcher: Arc<dyn Fetcher>,
    pacer: Arc<Pacer>,
    agent: String,
    origins: Mutex<HashMap<String, Slot>>,
}

impl RobotsGuard {
    pub fn new(fetcher: Arc<dyn Fetcher>, pacer: Arc<Pacer>, agent: impl Into<String>) -> Self {
        Self {
            fetcher,
            pacer,
            agent: agent.into(),
            origins: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether `target` may be fetched
    ///
    /// The first check for an origin fetches its robots.txt; concurrent
    /// checks for the same origin wait for that fetch instead of repeating it.
    pub async fn is_allowed(&self, target: &str) -> bool {
        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(_) => return true,
        };
        if !matches!(url.scheme(), "http" | "https") {
            return true;
        }
        let origin = url.origin().ascii_serialization();

        let slot = {
            let mut origins = self.origins.lock().await;
            origins.entry(origin.clone()).or_default().clone()
        };

        let mut cached = slot.lock().await;
        let needs_fetch = cached.as_ref().map_or(true, |c| c.is_stale());
        if needs_fetch {
            *cached = Some(CachedRobots::new(self.fetch_rules(&origin).await));
        }

        cached
            .as_ref()
            .map_or(true, |c| c.is_allowed(target, &self.agent))
    }

    /// Number of origins with cached rules
    pub async fn cached_origins(&self) -> usize {
        self.origins.lock().await.len()
    }

    async fn fetch_rules(&self, origin: &str) -> ParsedRobots {
        let robots_url = format!("{}/robots.txt", origin);
        self.pacer.wait_turn(TransportClass::Http).await;

        match self.fetcher.fetch(&robots_url).await {
            Ok(page) if (200..300).contains(&page.status) => {
                tracing::debug!("Loaded robots.txt for {}", origin);
                ParsedRobots::from_content(&String::from_utf8_lossy(&page.body))
            }
            Ok(page) => {
                tracing::debug!(
                    "No robots.txt for {} (HTTP {}), allowing all",
                    origin,
                    page.status
                );
                ParsedRobots::allow_all()
            }
            Err(e) => {
                tracing::debug!("Failed to fetch robots.txt for {}: {}, allowing all", origin, e);
                ParsedRobots::allow_all()
            }
        }
    }
}
