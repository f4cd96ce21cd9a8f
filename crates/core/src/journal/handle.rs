//! Journal emission handle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

/// One journal line: a lifecycle trace or a raw process output line,
/// optionally tagged with the download it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct JournalLine {
    pub timestamp: DateTime<Utc>,
    pub download_id: Option<String>,
    pub message: String,
}

/// Handle for emitting journal lines.
///
/// Cheaply cloneable and shareable across tasks. Lines are sent through
/// an async channel to be drained by the [`super::JournalWriter`].
#[derive(Clone)]
pub struct JournalHandle {
    tx: mpsc::Sender<JournalLine>,
}

impl JournalHandle {
    /// Creates a new handle from a channel sender.
    pub fn new(tx: mpsc::Sender<JournalLine>) -> Self {
        Self { tx }
    }

    /// Emits a journal line asynchronously.
    ///
    /// A closed channel is logged, not surfaced; the caller is never
    /// failed for journaling.
    pub async fn emit(&self, download_id: Option<&str>, message: impl Into<String>) {
        let line = Self::line(download_id, message);
        if let Err(e) = self.tx.send(line).await {
            tracing::error!("failed to emit journal line: {}", e);
        }
    }

    /// Emits a journal line without blocking.
    ///
    /// The line is dropped if the channel is full or closed; journaling
    /// never stalls a worker.
    pub fn try_emit(&self, download_id: Option<&str>, message: impl Into<String>) {
        let line = Self::line(download_id, message);
        if let Err(e) = self.tx.try_send(line) {
            tracing::debug!("journal line dropped: {}", e);
        }
    }

    fn line(download_id: Option<&str>, message: impl Into<String>) -> JournalLine {
        JournalLine {
            timestamp: Utc::now(),
            download_id: download_id.map(String::from),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_line() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle = JournalHandle::new(tx);

        handle.emit(Some("download_1"), "starting").await;

        let line = rx.recv().await.expect("should receive line");
        assert_eq!(line.download_id.as_deref(), Some("download_1"));
        assert_eq!(line.message, "starting");
    }

    #[tokio::test]
    async fn test_untagged_line() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle = JournalHandle::new(tx);

        handle.emit(None, "service started").await;

        let line = rx.recv().await.expect("should receive line");
        assert!(line.download_id.is_none());
    }

    #[test]
    fn test_try_emit() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle = JournalHandle::new(tx);

        handle.try_emit(Some("download_2"), "[download]  45.2%");

        let line = rx.try_recv().expect("should receive line");
        assert_eq!(line.download_id.as_deref(), Some("download_2"));
        assert_eq!(line.message, "[download]  45.2%");
    }

    #[test]
    fn test_try_emit_full_channel_drops_line() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = JournalHandle::new(tx);

        handle.try_emit(None, "first");
        // Channel is full now; the second line is silently dropped.
        handle.try_emit(None, "second");
    }

    #[tokio::test]
    async fn test_emit_closed_channel_does_not_panic() {
        let (tx, rx) = mpsc::channel::<JournalLine>(10);
        let handle = JournalHandle::new(tx);
        drop(rx);

        handle.emit(None, "orphaned").await;
        handle.try_emit(None, "orphaned");
    }

    #[test]
    fn test_line_has_timestamp() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle = JournalHandle::new(tx);

        let before = Utc::now();
        handle.try_emit(None, "stamped");
        let after = Utc::now();

        let line = rx.try_recv().expect("should receive line");
        assert!(line.timestamp >= before);
        assert!(line.timestamp <= after);
    }

    #[tokio::test]
    async fn test_cloned_handles_share_channel() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle1 = JournalHandle::new(tx);
        let handle2 = handle1.clone();

        handle1.emit(None, "one").await;
        handle2.emit(None, "two").await;

        assert_eq!(rx.recv().await.unwrap().message, "one");
        assert_eq!(rx.recv().await.unwrap().message, "two");
    }
}
