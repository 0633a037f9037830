//! Vendor module registry
//!
//! Every vendor module is a [`VendorModule`] built by a `module()` function
//! in its own file. The registry maps configured vendor names to those
//! builders and runs them with layered politeness: the global settings, then
//! the module's own overrides, then the overrides of the config entry.

pub mod asus;
pub mod avm;
pub mod dlink;

use std::sync::Arc;

use crate::crawler::{CrawlSummary, Engine, Fetcher, Politeness, PolitenessOverrides};
use crate::extract::{StepId, VendorModule};
use crate::sink::RecordSink;
use crate::CrawlerError;

/// Names accepted in `[[vendor]]` entries and on the command line
pub const KNOWN_VENDORS: [&str; 3] = [asus::NAME, dlink::NAME, avm::NAME];

pub fn is_known(name: &str) -> bool {
    KNOWN_VENDORS.contains(&name)
}

/// What a vendor run would do, for dry runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorPlan {
    pub name: String,
    pub politeness: Politeness,
    pub seeds: Vec<String>,
    pub allowed_domains: Vec<String>,
}

impl VendorPlan {
    fn of<S: StepId>(
        module: &VendorModule<S>,
        global: &Politeness,
        entry: &PolitenessOverrides,
    ) -> Self {
        Self {
            name: module.name().to_string(),
            politeness: effective_politeness(module, global, entry),
            seeds: module.seeds().iter().map(|r| r.target.clone()).collect(),
            allowed_domains: module.allowed_domains().to_vec(),
        }
    }
}

/// Layers the module's overrides and then the entry's over `global`
pub fn effective_politeness<S: StepId>(
    module: &VendorModule<S>,
    global: &Politeness,
    entry: &PolitenessOverrides,
) -> Politeness {
    entry.apply(&module.politeness_overrides().apply(global))
}

/// Describes the run of vendor `name` without fetching anything
pub fn plan(
    name: &str,
    global: &Politeness,
    entry: &PolitenessOverrides,
) -> Result<VendorPlan, CrawlerError> {
    match name {
        asus::NAME => Ok(VendorPlan::of(&asus::module(), global, entry)),
        dlink::NAME => Ok(VendorPlan::of(&dlink::module(), global, entry)),
        avm::NAME => Ok(VendorPlan::of(&avm::module(), global, entry)),
        other => Err(CrawlerError::UnknownVendor(other.to_string())),
    }
}

/// Runs vendor `name` to completion, handing its records to `sink`
pub async fn run_vendor<K>(
    name: &str,
    fetcher: Arc<dyn Fetcher>,
    global: &Politeness,
    entry: &PolitenessOverrides,
    robots_agent: &str,
    sink: &mut K,
) -> Result<CrawlSummary, CrawlerError>
where
    K: RecordSink + ?Sized,
{
    let summary = match name {
        asus::NAME => run_module(asus::module(), fetcher, global, entry, robots_agent, sink).await,
        dlink::NAME => run_module(dlink::module(), fetcher, global, entry, robots_agent, sink).await,
        avm::NAME => run_module(avm::module(), fetcher, global, entry, robots_agent, sink).await,
        other => return Err(CrawlerError::UnknownVendor(other.to_string())),
    };
    Ok(summary)
}

/// Runs any vendor module with layered politeness
pub async fn run_module<S, K>(
    module: VendorModule<S>,
    fetcher: Arc<dyn Fetcher>,
    global: &Politeness,
    entry: &PolitenessOverrides,
    robots_agent: &str,
    sink: &mut K,
) -> CrawlSummary
where
    S: StepId,
    K: RecordSink + ?Sized,
{
    let politeness = effective_politeness(&module, global, entry);
    Engine::new(module, fetcher, politeness)
        .with_robots_agent(robots_agent)
        .run(sink)
        .await
}
