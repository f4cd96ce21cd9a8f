//! Mock history store for testing.

use std::sync::Mutex;

use crate::history::{HistoryError, HistoryRecord, HistoryStore};

/// In-memory history store that records calls for assertions.
///
/// Mirrors the upsert-by-(title, url) behavior of the real store and
/// can be made to fail on demand.
pub struct MockHistoryStore {
    records: Mutex<Vec<HistoryRecord>>,
    fail_next: Mutex<bool>,
}

impl Default for MockHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHistoryStore {
    /// Creates an empty mock store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_next: Mutex::new(false),
        }
    }

    /// Makes the next `record` call fail.
    pub fn fail_next(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    /// All stored records, oldest first.
    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl HistoryStore for MockHistoryStore {
    fn record(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
            return Err(HistoryError::Database("mock failure".to_string()));
        }

        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.title == record.title && r.url == record.url)
        {
            *existing = record.clone();
        } else {
            records.push(record.clone());
        }
        Ok(())
    }

    fn list(&self, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    fn count(&self) -> Result<usize, HistoryError> {
        Ok(self.records.lock().unwrap().len())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        self.records.lock().unwrap().clear();
        Ok(())
    }
}
