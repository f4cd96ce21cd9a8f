//! Download queue.
//!
//! The queue is the coordinator: it holds the pending queue and the
//! bounded active set, admits downloads in strict FIFO order, spawns
//! one detached worker per admitted download, and handles completion
//! and cancellation. Observers are notified after every structural
//! change.

mod config;
mod manager;
mod types;

pub use config::{QueueConfig, MAX_CONCURRENT, MIN_CONCURRENT};
pub use manager::DownloadQueue;
pub use types::{QueueStatus, QueueUpdateCallback};
