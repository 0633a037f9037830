use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::record::FirmwareRecord;
use crate::sink::{RecordSink, SinkError};

/// Keeps every accepted record in memory
///
/// Clones share the same storage, so a clone kept by the caller sees what
/// the engine delivered.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    records: Arc<Mutex<Vec<FirmwareRecord>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the records accepted so far
    pub fn records(&self) -> Vec<FirmwareRecord> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordSink for CollectingSink {
    async fn accept(&mut self, record: FirmwareRecord) -> Result<(), SinkError> {
        match self.records.lock() {
            Ok(mut guard) => guard.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
        Ok(())
    }
}
