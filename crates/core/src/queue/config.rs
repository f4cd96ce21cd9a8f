//! Queue configuration.

use serde::{Deserialize, Serialize};

/// Lowest accepted concurrency limit.
pub const MIN_CONCURRENT: usize = 1;

/// Highest accepted concurrency limit.
pub const MAX_CONCURRENT: usize = 10;

/// Configuration for the download queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of downloads running at once.
    ///
    /// Values outside 1..=10 are clamped at runtime.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_max_concurrent() -> usize {
    3
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}
