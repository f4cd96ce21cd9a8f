//! Journal writer task and ring buffer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::handle::{JournalHandle, JournalLine};

/// Bounded in-memory ring of recent journal lines.
///
/// The oldest lines are dropped once the capacity is reached.
pub struct JournalBuffer {
    capacity: usize,
    lines: Mutex<VecDeque<JournalLine>>,
}

impl JournalBuffer {
    /// Creates a buffer holding at most `capacity` lines.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Appends a line, evicting the oldest one when full.
    pub fn push(&self, line: JournalLine) {
        let mut lines = self.lines.lock().unwrap();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Up to `limit` most recent lines, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<JournalLine> {
        let lines = self.lines.lock().unwrap();
        let skip = lines.len().saturating_sub(limit);
        lines.iter().skip(skip).cloned().collect()
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        self.lines.lock().unwrap().len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all buffered lines.
    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

/// Background task that drains journal lines into the buffer.
pub struct JournalWriter {
    rx: mpsc::Receiver<JournalLine>,
    buffer: Arc<JournalBuffer>,
}

impl JournalWriter {
    /// Creates a new writer draining into `buffer`.
    pub fn new(rx: mpsc::Receiver<JournalLine>, buffer: Arc<JournalBuffer>) -> Self {
        Self { rx, buffer }
    }

    /// Runs the writer, consuming lines until every handle is dropped.
    ///
    /// Spawn this as a background task.
    pub async fn run(mut self) {
        tracing::info!("journal writer started");

        while let Some(line) = self.rx.recv().await {
            match &line.download_id {
                Some(id) => tracing::debug!(target: "journal", id = %id, "{}", line.message),
                None => tracing::debug!(target: "journal", "{}", line.message),
            }
            self.buffer.push(line);
        }

        tracing::info!("journal writer shutting down");
    }
}

/// Creates a complete journal system.
///
/// Returns:
/// - `JournalHandle` - for emitting lines (clone to share across tasks)
/// - `JournalWriter` - spawn with `tokio::spawn(writer.run())`
pub fn create_journal(
    buffer: Arc<JournalBuffer>,
    channel_capacity: usize,
) -> (JournalHandle, JournalWriter) {
    let (tx, rx) = mpsc::channel(channel_capacity);
    let handle = JournalHandle::new(tx);
    let writer = JournalWriter::new(rx, buffer);
    (handle, writer)
}
