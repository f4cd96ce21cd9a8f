//! Download model and output classification.
//!
//! A [`Download`] is the record for one requested fetch: immutable
//! identity fields plus lock-free progress/status that a single worker
//! writes and any number of observers read. [`classifier::classify_line`]
//! turns one line of process output into an updated progress/status pair.

mod classifier;
mod types;

pub use classifier::classify_line;
pub use types::{Download, DownloadRequest, DownloadSnapshot, DownloadStatus, MediaKind};
