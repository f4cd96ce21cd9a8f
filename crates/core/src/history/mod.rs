//! Download history persistence.
//!
//! Every download that reaches a terminal status is handed to the
//! history store. Records are matched for update purposes by their
//! `(title, url)` pair rather than by download id, so re-downloading
//! the same content updates the existing row.

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteHistoryStore;
pub use store::{HistoryError, HistoryStore};
pub use types::HistoryRecord;
