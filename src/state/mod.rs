//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RequestState`: lifecycle of a single traversal request (queued,
//!   dispatched, completed, handled, and the terminal skip states)

mod request_state;

pub use request_state::{InvalidTransition, RequestState};
