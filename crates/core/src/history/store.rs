//! History storage trait.

use thiserror::Error;

use super::types::HistoryRecord;

/// Errors that can occur in a history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Trait for history storage backends.
pub trait HistoryStore: Send + Sync {
    /// Inserts or updates a record.
    ///
    /// An existing row with the same `(title, url)` pair is updated in
    /// place; otherwise a new row is appended.
    fn record(&self, record: &HistoryRecord) -> Result<(), HistoryError>;

    /// Up to `limit` most recent records, newest first.
    fn list(&self, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError>;

    /// Number of stored records.
    fn count(&self) -> Result<usize, HistoryError>;

    /// Removes all records.
    fn clear(&self) -> Result<(), HistoryError>;
}
