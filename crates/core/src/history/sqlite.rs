//! SQLite-backed history store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::download::{DownloadStatus, MediaKind};

use super::store::{HistoryError, HistoryStore};
use super::types::HistoryRecord;

/// SQLite-backed history store.
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Opens (or creates) the history database at `path`.
    pub fn new(path: &Path) -> Result<Self, HistoryError> {
        let conn = Connection::open(path).map_err(|e| HistoryError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory history store (useful for testing).
    pub fn in_memory() -> Result<Self, HistoryError> {
        let conn =
            Connection::open_in_memory().map_err(|e| HistoryError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), HistoryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS download_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                title TEXT NOT NULL,
                format_id TEXT NOT NULL,
                media_kind TEXT NOT NULL,
                output_path TEXT NOT NULL,
                status TEXT NOT NULL,
                finished_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_title_url ON download_history(title, url);
            CREATE INDEX IF NOT EXISTS idx_history_finished_at ON download_history(finished_at);
            "#,
        )
        .map_err(|e| HistoryError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<HistoryRecord> {
        let url: String = row.get(0)?;
        let title: String = row.get(1)?;
        let format_id: String = row.get(2)?;
        let media_kind_json: String = row.get(3)?;
        let output_path: String = row.get(4)?;
        let status_json: String = row.get(5)?;
        let finished_at_str: String = row.get(6)?;

        // Rows are only ever written by this store; a value that fails
        // to parse degrades to a failed-looking record rather than
        // erroring the whole query.
        let media_kind: MediaKind =
            serde_json::from_str(&media_kind_json).unwrap_or(MediaKind::Video);
        let status: DownloadStatus =
            serde_json::from_str(&status_json).unwrap_or(DownloadStatus::Failed);
        let finished_at = DateTime::parse_from_rfc3339(&finished_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(HistoryRecord {
            url,
            title,
            format_id,
            media_kind,
            output_path,
            status,
            finished_at,
        })
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn record(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        let conn = self.conn.lock().unwrap();

        let media_kind_json = serde_json::to_string(&record.media_kind)
            .map_err(|e| HistoryError::Database(e.to_string()))?;
        let status_json = serde_json::to_string(&record.status)
            .map_err(|e| HistoryError::Database(e.to_string()))?;
        let finished_at = record.finished_at.to_rfc3339();

        let updated = conn
            .execute(
                "UPDATE download_history SET format_id = ?, media_kind = ?, output_path = ?, status = ?, finished_at = ? WHERE title = ? AND url = ?",
                params![
                    record.format_id,
                    media_kind_json,
                    record.output_path,
                    status_json,
                    finished_at,
                    record.title,
                    record.url,
                ],
            )
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        if updated == 0 {
            conn.execute(
                "INSERT INTO download_history (url, title, format_id, media_kind, output_path, status, finished_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    record.url,
                    record.title,
                    record.format_id,
                    media_kind_json,
                    record.output_path,
                    status_json,
                    finished_at,
                ],
            )
            .map_err(|e| HistoryError::Database(e.to_string()))?;
        }

        Ok(())
    }

    fn list(&self, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT url, title, format_id, media_kind, output_path, status, finished_at FROM download_history ORDER BY finished_at DESC, id DESC LIMIT ?",
            )
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let records = stmt
            .query_map(params![limit as i64], Self::row_to_record)
            .map_err(|e| HistoryError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        Ok(records)
    }

    fn count(&self) -> Result<usize, HistoryError> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM download_history", [], |row| {
                row.get(0)
            })
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        Ok(count as usize)
    }

    fn clear(&self) -> Result<(), HistoryError> {
        let conn = self.conn.lock().unwrap();

        conn.execute("DELETE FROM download_history", [])
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        Ok(())
    }
}
