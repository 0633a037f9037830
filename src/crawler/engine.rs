//! Traversal engine - the crawl loop every vendor module plugs into
//!
//! The engine's driver loop is the only owner of the frontier. It:
//! - Filters offsite requests as they are enqueued
//! - Dispatches queued requests while a slot under the concurrency ceiling
//!   is free, skipping dedup keys already dispatched in this run
//! - Runs each fetch as a task holding a semaphore permit; the task checks
//!   robots.txt (HTTP only, when enabled), waits for its pacing slot and
//!   fetches
//! - Routes every completed response to the step of its originating request
//! - Normalizes metadata and hands records to the sink
//!
//! The run ends when nothing is queued and nothing is in flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;

use crate::crawler::frontier::{Dequeued, Frontier};
use crate::crawler::{CrawlSummary, Fetcher, Pacer, Politeness, TransportFailure};
use crate::extract::{
    ModuleParts, ResponseStatus, StepHandler, StepId, TraversalOutcome, TraversalRequest,
    TraversalResponse, VendorModule,
};
use crate::record::{normalize, RawMetadata};
use crate::robots::RobotsGuard;
use crate::sink::RecordSink;
use crate::state::RequestState;
use crate::url::{classify_transport, extract_host, is_allowed_host, TransportClass};
use crate::UrlError;

/// Agent token matched against robots.txt groups unless overridden
pub const DEFAULT_ROBOTS_AGENT: &str = "FirmwareCrawler";

/// Log progress every this many handled responses
const PROGRESS_INTERVAL: u64 = 10;

/// What a fetch task reports back to the driver
struct Completion<S> {
    step: S,
    target: String,
    outcome: TaskOutcome,
}

enum TaskOutcome {
    Response(TraversalResponse),
    RobotsDenied,
}

/// Crawl engine for a single vendor module
pub struct Engine<S> {
    name: String,
    steps: HashMap<S, StepHandler<S>>,
    allowed_domains: Vec<String>,
    frontier: Frontier<S>,
    fetcher: Arc<dyn Fetcher>,
    pacer: Arc<Pacer>,
    robots: Option<Arc<RobotsGuard>>,
    semaphore: Arc<Semaphore>,
    politeness: Politeness,
    summary: CrawlSummary,
}

impl<S: StepId> Engine<S> {
    /// Creates an engine for `module`, seeded with the module's start points
    ///
    /// `politeness` is the effective setting for this run; the engine does
    /// not layer the module's overrides on top of it.
    pub fn new(module: VendorModule<S>, fetcher: Arc<dyn Fetcher>, politeness: Politeness) -> Self {
        let ModuleParts {
            name,
            seeds,
            allowed_domains,
            steps,
        } = module.into_parts();

        let ceiling = politeness.concurrent_requests.max(1);
        let pacer = Arc::new(Pacer::new(&politeness));
        let robots = politeness.obey_robots.then(|| {
            Arc::new(RobotsGuard::new(
                fetcher.clone(),
                pacer.clone(),
                DEFAULT_ROBOTS_AGENT,
            ))
        });

        let mut engine = Self {
            name,
            steps,
            allowed_domains,
            frontier: Frontier::new(ceiling),
            fetcher,
            pacer,
            robots,
            semaphore: Arc::new(Semaphore::new(ceiling)),
            politeness,
            summary: CrawlSummary::default(),
        };
        engine.seed(seeds);
        engine
    }

    /// Uses `agent` when matching robots.txt groups
    pub fn with_robots_agent(mut self, agent: impl Into<String>) -> Self {
        if self.robots.is_some() {
            self.robots = Some(Arc::new(RobotsGuard::new(
                self.fetcher.clone(),
                self.pacer.clone(),
                agent,
            )));
        }
        self
    }

    /// Enqueues additional start points
    pub fn seed<I>(&mut self, requests: I)
    where
        I: IntoIterator<Item = TraversalRequest<S>>,
    {
        for request in requests {
            self.enqueue(request);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn politeness(&self) -> &Politeness {
        &self.politeness
    }

    /// Number of requests waiting for dispatch
    pub fn queued(&self) -> usize {
        self.frontier.len()
    }

    /// Drains the frontier and returns the run's counters
    pub async fn run<K>(mut self, sink: &mut K) -> CrawlSummary
    where
        K: RecordSink + ?Sized,
    {
        let start_time = Instant::now();
        tracing::info!(
            "Starting crawl for {} with {} seed(s), {} concurrent, robots {}",
            self.name,
            self.frontier.len(),
            self.politeness.concurrent_requests,
            if self.robots.is_some() { "obeyed" } else { "ignored" }
        );

        let mut tasks: JoinSet<Completion<S>> = JoinSet::new();

        loop {
            self.dispatch_ready(&mut tasks);

            let joined = match tasks.join_next().await {
                Some(joined) => joined,
                None => break,
            };

            match joined {
                Ok(completion) => self.handle_completion(completion, sink).await,
                Err(e) => {
                    self.frontier.complete();
                    tracing::error!("Fetch task for {} died: {}", self.name, e);
                    self.settle(RequestState::Dispatched, RequestState::Failed, "<task>");
                }
            }
        }

        debug_assert!(self.frontier.is_exhausted());

        if let Err(e) = sink.finish().await {
            tracing::warn!("Sink failed to finish for {}: {}", self.name, e);
            self.summary.sink_errors += 1;
        }

        self.summary.elapsed = start_time.elapsed();
        tracing::info!("Crawl for {} completed: {}", self.name, self.summary);
        self.summary
    }

    /// Dispatches queued requests until the ceiling is reached or the queue is empty
    fn dispatch_ready(&mut self, tasks: &mut JoinSet<Completion<S>>) {
        while self.frontier.has_capacity() {
            let permit = match self.semaphore.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let request = match self.frontier.next() {
                Some(Dequeued::Dispatch(request)) => request,
                Some(Dequeued::Duplicate(request)) => {
                    tracing::debug!("Skipping duplicate {}", request.dedup_key);
                    self.settle(RequestState::Queued, RequestState::Duplicate, &request.target);
                    continue;
                }
                None => break,
            };

            self.summary.dispatched += 1;
            tracing::debug!("Dispatching {} for step {:?}", request.target, request.step);

            tasks.spawn(fetch_task(
                request,
                permit,
                self.fetcher.clone(),
                self.pacer.clone(),
                self.robots.clone(),
            ));
        }
    }

    async fn handle_completion<K>(&mut self, completion: Completion<S>, sink: &mut K)
    where
        K: RecordSink + ?Sized,
    {
        self.frontier.complete();

        let Completion {
            step,
            target,
            outcome,
        } = completion;

        let response = match outcome {
            TaskOutcome::Response(response) => response,
            TaskOutcome::RobotsDenied => {
                tracing::debug!("Disallowed by robots.txt: {}", target);
                self.settle(RequestState::Dispatched, RequestState::RobotsDenied, &target);
                return;
            }
        };

        if let ResponseStatus::Failed(failure) = &response.status {
            tracing::debug!("Transport failure for {}: {}", target, failure);
            self.summary.transport_failures += 1;
        }

        let handled = match self.steps.get(&step) {
            None => Err("no handler registered"),
            Some(handler) if !handler.handles(&response.status) => Err("status not handled"),
            Some(handler) => Ok(handler.call(&response)),
        };

        let outcome = match handled {
            Ok(outcome) => outcome,
            Err(reason) => {
                tracing::warn!(
                    "Dropping {} response from {} for step {:?}: {}",
                    response.status,
                    target,
                    step,
                    reason
                );
                self.settle(RequestState::Completed, RequestState::Discarded, &target);
                return;
            }
        };

        self.settle(RequestState::Completed, RequestState::Handled, &target);

        match outcome {
            TraversalOutcome::NewRequests(requests) => {
                tracing::debug!("{} yielded {} request(s)", target, requests.len());
                self.seed(requests);
            }
            TraversalOutcome::Metadata(raw) => self.deliver(raw, &target, sink).await,
            TraversalOutcome::Empty => tracing::debug!("{} yielded nothing", target),
        }

        if self.summary.handled % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress ({}): {} responses handled, {} queued, {} in flight, {} records",
                self.name,
                self.summary.handled,
                self.frontier.len(),
                self.frontier.in_flight(),
                self.summary.records
            );
        }
    }

    async fn deliver<K>(&mut self, raw: RawMetadata, source: &str, sink: &mut K)
    where
        K: RecordSink + ?Sized,
    {
        match normalize(raw) {
            Ok(record) => {
                tracing::debug!(
                    "Record {} {} from {}",
                    record.device_name(),
                    record.firmware_version(),
                    source
                );
                match sink.accept(record).await {
                    Ok(()) => self.summary.records += 1,
                    Err(e) => {
                        tracing::warn!("Sink refused record from {}: {}", source, e);
                        self.summary.sink_errors += 1;
                    }
                }
            }
            Err(reason) => {
                tracing::warn!("Rejected record from {}: {}", source, reason);
                self.summary.rejected += 1;
            }
        }
    }

    fn enqueue(&mut self, request: TraversalRequest<S>) {
        if !self.allowed_domains.is_empty() {
            let allowed = extract_host(&request.target)
                .map_or(false, |host| is_allowed_host(&self.allowed_domains, &host));
            if !allowed {
                tracing::debug!("Filtered offsite request to {}", request.target);
                self.settle(RequestState::Queued, RequestState::Offsite, &request.target);
                return;
            }
        }
        self.frontier.push(request);
    }

    fn settle(&mut self, from: RequestState, to: RequestState, target: &str) {
        match from.transition(to) {
            Ok(state) => self.summary.record_terminal(state),
            Err(e) => tracing::error!("{} for {}", e, target),
        }
    }
}

async fn fetch_task<S: StepId>(
    request: TraversalRequest<S>,
    permit: OwnedSemaphorePermit,
    fetcher: Arc<dyn Fetcher>,
    pacer: Arc<Pacer>,
    robots: Option<Arc<RobotsGuard>>,
) -> Completion<S> {
    let _permit = permit;
    let TraversalRequest {
        target,
        step,
        context,
        ..
    } = request;

    let class = match classify_transport(&target) {
        Ok(class) => class,
        Err(e) => {
            let failure = match e {
                UrlError::InvalidScheme(scheme) => TransportFailure::UnsupportedScheme(scheme),
                other => TransportFailure::Other(other.to_string()),
            };
            let response = TraversalResponse::from_fetch(Err(failure), &target, context);
            return Completion {
                step,
                target,
                outcome: TaskOutcome::Response(response),
            };
        }
    };

    if class == TransportClass::Http {
        if let Some(guard) = &robots {
            if !guard.is_allowed(&target).await {
                return Completion {
                    step,
                    target,
                    outcome: TaskOutcome::RobotsDenied,
                };
            }
        }
    }

    pacer.wait_turn(class).await;
    let result = fetcher.fetch(&target).await;
    let response = TraversalResponse::from_fetch(result, &target, context);

    Completion {
        step,
        target,
        outcome: TaskOutcome::Response(response),
    }
}
