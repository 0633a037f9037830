//! Dispatch pacing per transport class
//!
//! Every dispatch of a class waits until the previous dispatch of that class
//! is at least `download_delay + jitter` in the past. Jitter is drawn
//! uniformly from the configured range for each interval.

use std::time::Duration;

use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::crawler::Politeness;
use crate::url::TransportClass;

#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    jitter_min: Duration,
    jitter_max: Duration,
    http: Mutex<Option<Instant>>,
    ftp: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(politeness: &Politeness) -> Self {
        let (jitter_min, jitter_max) = if politeness.jitter_min <= politeness.jitter_max {
            (politeness.jitter_min, politeness.jitter_max)
        } else {
            (politeness.jitter_max, politeness.jitter_min)
        };

        Self {
            delay: politeness.download_delay,
            jitter_min,
            jitter_max,
            http: Mutex::new(None),
            ftp: Mutex::new(None),
        }
    }

    /// Waits until a dispatch of `class` is allowed, then claims the slot
    ///
    /// The gate lock is held while sleeping, so waiters of one class are
    /// released one interval apart.
    pub async fn wait_turn(&self, class: TransportClass) {
        let gate = match class {
            TransportClass::Http => &self.http,
            TransportClass::Ftp => &self.ftp,
        };

        let mut last = gate.lock().await;
        if let Some(previous) = *last {
            let due = previous + self.next_interval();
            if due > Instant::now() {
                tracing::trace!(
                    "Pacing {} dispatch for {:?}",
                    class.as_str(),
                    due - Instant::now()
                );
                sleep_until(due).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Draws the interval to the next dispatch
    pub fn next_interval(&self) -> Duration {
        if self.jitter_max.is_zero() {
            return self.delay;
        }
        let jitter_ms = rand::thread_rng()
            .gen_range(self.jitter_min.as_millis() as u64..=self.jitter_max.as_millis() as u64);
        self.delay + Duration::from_millis(jitter_ms)
    }
}
