//! The vendor extractor contract
//!
//! A vendor module is a set of pure step functions. Each step is bound to a
//! step identifier and maps a [`TraversalResponse`] to a
//! [`TraversalOutcome`]: more requests, one candidate record, or nothing.
//! Steps never perform I/O; everything they need arrives in the response and
//! its echoed [`Context`].

mod context;
pub mod html;
mod module;
mod request;
mod response;

pub use context::{Context, ContextValue};
pub use module::{StatusPolicy, StepFn, StepHandler, TraversalOutcome, VendorModule};
pub(crate) use module::ModuleParts;
pub use request::{StepId, TraversalRequest};
pub use response::{ResponseStatus, TraversalResponse};

/// Device class vendor modules fall back to when a model cannot be classified
pub const UNKNOWN_DEVICE_CLASS: &str = "unknown";
