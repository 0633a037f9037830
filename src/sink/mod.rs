//! Hand-off sinks for normalized firmware records
//!
//! The engine calls [`RecordSink::accept`] once per record. A sink error is
//! logged by the engine and the run continues.

mod collect;
mod jsonl;

pub use collect::CollectingSink;
pub use jsonl::JsonLinesSink;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::FirmwareRecord;

/// Errors a sink may report for a single record
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receiver of normalized firmware records
#[async_trait]
pub trait RecordSink: Send {
    async fn accept(&mut self, record: FirmwareRecord) -> Result<(), SinkError>;

    /// Flushes anything buffered; called once when a run ends
    async fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
