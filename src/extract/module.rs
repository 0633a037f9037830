use std::collections::HashMap;

use crate::crawler::PolitenessOverrides;
use crate::extract::{Context, ResponseStatus, StepId, TraversalRequest, TraversalResponse};
use crate::record::RawMetadata;

/// What a step produced from one response
#[derive(Debug)]
pub enum TraversalOutcome<S> {
    /// Further requests to enqueue
    NewRequests(Vec<TraversalRequest<S>>),

    /// A candidate record for the normalizer
    Metadata(RawMetadata),

    /// Nothing to do here; the branch ends
    Empty,
}

/// Signature every step handler has
pub type StepFn<S> = Box<dyn Fn(&TraversalResponse, &Context) -> TraversalOutcome<S> + Send + Sync>;

/// Which response statuses a step wants to see
///
/// 2xx codes are always handled. Anything else must be listed explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPolicy {
    extra_codes: Vec<u16>,
    accept_failures: bool,
}

impl StatusPolicy {
    pub fn success_only() -> Self {
        Self::default()
    }

    /// Also hand responses with `code` to the step
    pub fn also(mut self, code: u16) -> Self {
        if !self.extra_codes.contains(&code) {
            self.extra_codes.push(code);
        }
        self
    }

    /// Also hand transport failures to the step
    pub fn with_failures(mut self) -> Self {
        self.accept_failures = true;
        self
    }

    pub fn handles(&self, status: &ResponseStatus) -> bool {
        match status {
            ResponseStatus::Code(code) => {
                (200..300).contains(code) || self.extra_codes.contains(code)
            }
            ResponseStatus::Failed(_) => self.accept_failures,
        }
    }
}

/// A step handler together with its status policy
pub struct StepHandler<S> {
    handler: StepFn<S>,
    policy: StatusPolicy,
}

impl<S> StepHandler<S> {
    pub fn handles(&self, status: &ResponseStatus) -> bool {
        self.policy.handles(status)
    }

    pub fn call(&self, response: &TraversalResponse) -> TraversalOutcome<S> {
        (self.handler)(response, &response.context)
    }
}

/// Everything the engine needs to crawl one vendor
///
/// Built once at registration time: seeds, allowed domains, politeness the
/// vendor asks for, and the table mapping each step to its handler.
pub struct VendorModule<S> {
    name: String,
    seeds: Vec<TraversalRequest<S>>,
    allowed_domains: Vec<String>,
    politeness: PolitenessOverrides,
    steps: HashMap<S, StepHandler<S>>,
}

impl<S: StepId> VendorModule<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seeds: Vec::new(),
            allowed_domains: Vec::new(),
            politeness: PolitenessOverrides::default(),
            steps: HashMap::new(),
        }
    }

    pub fn seed(mut self, request: TraversalRequest<S>) -> Self {
        self.seeds.push(request);
        self
    }

    /// Restricts the crawl to these hosts (exact or `*.` wildcard patterns)
    pub fn allow_domains<I, D>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn politeness(mut self, overrides: PolitenessOverrides) -> Self {
        self.politeness = overrides;
        self
    }

    /// Registers a step that handles 2xx responses only
    pub fn step<F>(self, id: S, handler: F) -> Self
    where
        F: Fn(&TraversalResponse, &Context) -> TraversalOutcome<S> + Send + Sync + 'static,
    {
        self.step_handling(id, StatusPolicy::success_only(), handler)
    }

    /// Registers a step with an explicit status policy
    pub fn step_handling<F>(mut self, id: S, policy: StatusPolicy, handler: F) -> Self
    where
        F: Fn(&TraversalResponse, &Context) -> TraversalOutcome<S> + Send + Sync + 'static,
    {
        self.steps.insert(
            id,
            StepHandler {
                handler: Box::new(handler),
                policy,
            },
        );
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seeds(&self) -> &[TraversalRequest<S>] {
        &self.seeds
    }

    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    pub fn politeness_overrides(&self) -> &PolitenessOverrides {
        &self.politeness
    }

    pub fn handler(&self, id: S) -> Option<&StepHandler<S>> {
        self.steps.get(&id)
    }

    /// Splits the module into its parts for the engine
    pub(crate) fn into_parts(self) -> ModuleParts<S> {
        ModuleParts {
            name: self.name,
            seeds: self.seeds,
            allowed_domains: self.allowed_domains,
            steps: self.steps,
        }
    }
}

pub(crate) struct ModuleParts<S> {
    pub name: String,
    pub seeds: Vec<TraversalRequest<S>>,
    pub allowed_domains: Vec<String>,
    pub steps: HashMap<S, StepHandler<S>>,
}

impl<S> std::fmt::Debug for VendorModule<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorModule")
            .field("name", &self.name)
            .field("seeds", &self.seeds.len())
            .field("allowed_domains", &self.allowed_domains)
            .field("steps", &self.steps.len())
            .finish()
    }
}
