//! Crawler module: the traversal engine and everything it drives
//!
//! This module contains:
//! - The fetch client trait and its reqwest implementation
//! - The frontier with dedup and the in-flight ceiling
//! - Per-transport-class pacing
//! - The engine's driver loop and run counters

mod engine;
mod fetcher;
mod frontier;
mod pacing;
mod politeness;
mod stats;

pub use engine::{Engine, DEFAULT_ROBOTS_AGENT};
pub use fetcher::{
    build_http_client, user_agent_string, FetchedPage, Fetcher, HttpFetcher, TransportFailure,
};
pub use frontier::{Dequeued, Frontier};
pub use pacing::Pacer;
pub use politeness::{Politeness, PolitenessOverrides};
pub use stats::CrawlSummary;
