use std::collections::{HashSet, VecDeque};

use crate::extract::TraversalRequest;

/// Pending requests plus the bookkeeping that keeps dispatch honest
///
/// The frontier hands out requests in FIFO order. A dedup key is recorded
/// the moment its request is dispatched; a later request with the same key
/// is refused. The in-flight count never exceeds the ceiling.
#[derive(Debug)]
pub struct Frontier<S> {
    queue: VecDeque<TraversalRequest<S>>,
    dispatched: HashSet<String>,
    in_flight: usize,
    ceiling: usize,
}

/// Result of taking the next request off the frontier
#[derive(Debug)]
pub enum Dequeued<S> {
    /// Dispatch this request; its key is now recorded and a slot is taken
    Dispatch(TraversalRequest<S>),

    /// Key was already dispatched in this run
    Duplicate(TraversalRequest<S>),
}

impl<S> Frontier<S> {
    pub fn new(ceiling: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            dispatched: HashSet::new(),
            in_flight: 0,
            ceiling: ceiling.max(1),
        }
    }

    pub fn push(&mut self, request: TraversalRequest<S>) {
        self.queue.push_back(request);
    }

    /// Takes the next request if a dispatch slot is free
    pub fn next(&mut self) -> Option<Dequeued<S>> {
        if !self.has_capacity() {
            return None;
        }

        let request = self.queue.pop_front()?;
        if !self.dispatched.insert(request.dedup_key.clone()) {
            return Some(Dequeued::Duplicate(request));
        }

        self.in_flight += 1;
        Some(Dequeued::Dispatch(request))
    }

    /// Releases the slot of a finished dispatch
    pub fn complete(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn has_capacity(&self) -> bool {
        self.in_flight < self.ceiling
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Number of requests waiting for dispatch
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// True once nothing is queued and nothing is in flight
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }

    pub fn was_dispatched(&self, key: &str) -> bool {
        self.dispatched.contains(key)
    }
}
