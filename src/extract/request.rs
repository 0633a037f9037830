use std::fmt::Debug;
use std::hash::Hash;

use crate::extract::{Context, ContextValue};
use crate::url::canonical_url;

/// Identifier of a traversal step within one vendor module
///
/// Vendor modules use a small `enum` for this. Anything `Copy + Eq + Hash`
/// qualifies.
pub trait StepId: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> StepId for T where T: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

/// A pending visit to a target location, bound to the step that will
/// process its response
///
/// Consumed by the engine on dispatch. The dedup key defaults to the target
/// itself; overriding it lets an extractor revisit a target it has already
/// fetched in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalRequest<S> {
    pub target: String,
    pub step: S,
    pub context: Context,
    pub dedup_key: String,
}

impl<S: StepId> TraversalRequest<S> {
    pub fn new(target: impl Into<String>, step: S) -> Self {
        let target = target.into();
        Self {
            dedup_key: target.clone(),
            target,
            step,
            context: Context::new(),
        }
    }

    /// Replaces the whole context bag
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Adds a single context entry
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn with_dedup_key(mut self, key: impl Into<String>) -> Self {
        self.dedup_key = key.into();
        self
    }

    /// Derives the dedup key from the canonical form of the target
    ///
    /// Targets that differ only in fragment, tracking parameters, query order
    /// or host case then collapse to one visit. A target that does not parse
    /// keeps its current key.
    pub fn canonical(mut self) -> Self {
        if let Ok(key) = canonical_url(&self.target) {
            self.dedup_key = key;
        }
        self
    }
}
