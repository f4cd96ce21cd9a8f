//! Types for the download queue.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Observer invoked after every structural change to the queue or
/// active set (submission, admission, completion, cancellation,
/// capacity change). Not invoked for in-place progress updates, and
/// never invoked while the queue's internal lock is held, so it may
/// safely call back into the queue.
pub type QueueUpdateCallback = Arc<dyn Fn() + Send + Sync>;

/// Point-in-time queue counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Downloads currently bound to a running worker.
    pub active: usize,
    /// Downloads waiting for admission.
    pub queued: usize,
    /// Current concurrency limit.
    pub max_concurrent: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default() {
        let status = QueueStatus::default();
        assert_eq!(status.active, 0);
        assert_eq!(status.queued, 0);
    }

    #[test]
    fn test_status_serialization() {
        let status = QueueStatus {
            active: 2,
            queued: 4,
            max_concurrent: 3,
        };
        let json = serde_json::to_string(&status).unwrap();
        let parsed: QueueStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.active, 2);
        assert_eq!(parsed.queued, 4);
        assert_eq!(parsed.max_concurrent, 3);
    }
}
