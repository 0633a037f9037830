use std::fmt;
use std::time::Duration;

use crate::state::RequestState;

/// Counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Requests handed to the fetch client
    pub dispatched: u64,

    /// Responses a step handled
    pub handled: u64,

    /// Responses dropped because their step does not handle the status
    pub discarded: u64,

    /// Fetch tasks that died without a response
    pub failed: u64,

    /// Requests skipped because their dedup key was already dispatched
    pub duplicates: u64,

    /// Requests skipped because their host is not allowed
    pub offsite: u64,

    /// Requests skipped because robots.txt disallows them
    pub robots_denied: u64,

    /// Responses that carried a transport failure
    pub transport_failures: u64,

    /// Records the sink accepted
    pub records: u64,

    /// Metadata the normalizer rejected
    pub rejected: u64,

    /// Records the sink refused
    pub sink_errors: u64,

    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Counts a request reaching a terminal state
    pub fn record_terminal(&mut self, state: RequestState) {
        match state {
            RequestState::Handled => self.handled += 1,
            RequestState::Discarded => self.discarded += 1,
            RequestState::Failed => self.failed += 1,
            RequestState::Duplicate => self.duplicates += 1,
            RequestState::Offsite => self.offsite += 1,
            RequestState::RobotsDenied => self.robots_denied += 1,
            RequestState::Queued | RequestState::Dispatched | RequestState::Completed => {}
        }
    }

    /// Total requests that ended in a skip state
    pub fn skipped(&self) -> u64 {
        self.duplicates + self.offsite + self.robots_denied
    }

    /// Adds another run's counters into this one
    pub fn merge(&mut self, other: &CrawlSummary) {
        self.dispatched += other.dispatched;
        self.handled += other.handled;
        self.discarded += other.discarded;
        self.failed += other.failed;
        self.duplicates += other.duplicates;
        self.offsite += other.offsite;
        self.robots_denied += other.robots_denied;
        self.transport_failures += other.transport_failures;
        self.records += other.records;
        self.rejected += other.rejected;
        self.sink_errors += other.sink_errors;
        self.elapsed += other.elapsed;
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dispatched, {} handled, {} discarded, {} skipped, {} records, {} rejected in {:.1}s",
            self.dispatched,
            self.handled,
            self.discarded,
            self.skipped(),
            self.records,
            self.rejected,
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_terminal_counts() {
        let mut summary = CrawlSummary::default();
        for state in RequestState::all_states() {
            summary.record_terminal(state);
        }

        assert_eq!(summary.handled, 1);
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped(), 3);
        assert_eq!(summary.dispatched, 0);
    }

    #[test]
    fn test_merge() {
        let mut total = CrawlSummary::default();
        let run = CrawlSummary {
            dispatched: 3,
            records: 2,
            elapsed: Duration::from_secs(1),
            ..Default::default()
        };
        total.merge(&run);
        total.merge(&run);

        assert_eq!(total.dispatched, 6);
        assert_eq!(total.records, 4);
        assert_eq!(total.elapsed, Duration::from_secs(2));
    }

    #[test]
    fn test_display() {
        let summary = CrawlSummary {
            dispatched: 5,
            handled: 4,
            records: 2,
            duplicates: 1,
            ..Default::default()
        };
        assert_eq!(
            summary.to_string(),
            "5 dispatched, 4 handled, 0 discarded, 1 skipped, 2 records, 0 rejected in 0.0s"
        );
    }
}
