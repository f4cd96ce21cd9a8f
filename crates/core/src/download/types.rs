//! Core download data types.

use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of media being fetched.
///
/// Controls format selector construction and whether a merge container
/// is requested from the external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
}

/// Lifecycle status of a download.
///
/// `Pending` exists only between construction and the first enqueue step
/// inside `submit` and is never externally observable. `Completed`,
/// `Failed` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DownloadStatus {
    Pending = 0,
    Queued = 1,
    Downloading = 2,
    Merging = 3,
    Processing = 4,
    CleaningUp = 5,
    Completed = 6,
    Failed = 7,
    Canceled = 8,
}

impl DownloadStatus {
    /// Returns the status as a snake_case string (e.g. "cleaning_up").
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Pending => "pending",
            DownloadStatus::Queued => "queued",
            DownloadStatus::Downloading => "downloading",
            DownloadStatus::Merging => "merging",
            DownloadStatus::Processing => "processing",
            DownloadStatus::CleaningUp => "cleaning_up",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Failed => "failed",
            DownloadStatus::Canceled => "canceled",
        }
    }

    /// Whether no further transitions can occur from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadStatus::Completed | DownloadStatus::Failed | DownloadStatus::Canceled
        )
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => DownloadStatus::Pending,
            1 => DownloadStatus::Queued,
            2 => DownloadStatus::Downloading,
            3 => DownloadStatus::Merging,
            4 => DownloadStatus::Processing,
            5 => DownloadStatus::CleaningUp,
            6 => DownloadStatus::Completed,
            7 => DownloadStatus::Failed,
            // Only discriminants written by `Download::set_status` are
            // ever stored, so this arm covers exactly `Canceled`.
            _ => DownloadStatus::Canceled,
        }
    }
}

/// Submission payload for a new download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Source URL.
    pub url: String,
    /// Format selector; the sentinel "best" picks the best available
    /// streams.
    pub format_id: String,
    /// Kind of media being fetched.
    pub media_kind: MediaKind,
    /// Output path template handed to the external tool.
    pub output_path: String,
    /// Display title; also the secondary match key for history updates.
    pub title: String,
}

/// One requested download.
///
/// Identity fields are immutable after construction. `progress` and
/// `status` are written by the single worker that owns the download
/// while it is active and read by any number of other threads without
/// additional locking.
#[derive(Debug)]
pub struct Download {
    pub id: String,
    pub url: String,
    pub format_id: String,
    pub media_kind: MediaKind,
    pub output_path: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    progress: AtomicU8,
    status: AtomicU8,
}

impl Download {
    /// Creates a new download in `Pending` status with zero progress.
    pub fn new(id: impl Into<String>, request: DownloadRequest) -> Self {
        Self {
            id: id.into(),
            url: request.url,
            format_id: request.format_id,
            media_kind: request.media_kind,
            output_path: request.output_path,
            title: request.title,
            created_at: Utc::now(),
            progress: AtomicU8::new(0),
            status: AtomicU8::new(DownloadStatus::Pending as u8),
        }
    }

    /// Current progress percentage (0-100).
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Acquire)
    }

    /// Stores a new progress percentage, clamped to 100.
    pub fn set_progress(&self, percent: u8) {
        self.progress.store(percent.min(100), Ordering::Release);
    }

    /// Current status.
    pub fn status(&self) -> DownloadStatus {
        DownloadStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Stores a new status.
    ///
    /// Terminal statuses are final: an attempt to transition out of
    /// `Completed`, `Failed` or `Canceled` is refused. Returns whether
    /// the status was actually updated.
    pub fn set_status(&self, status: DownloadStatus) -> bool {
        self.status
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if DownloadStatus::from_u8(current).is_terminal() {
                    None
                } else {
                    Some(status as u8)
                }
            })
            .is_ok()
    }

    /// Point-in-time copy for API responses and display.
    pub fn snapshot(&self) -> DownloadSnapshot {
        DownloadSnapshot {
            id: self.id.clone(),
            url: self.url.clone(),
            format_id: self.format_id.clone(),
            media_kind: self.media_kind,
            output_path: self.output_path.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            progress: self.progress(),
            status: self.status(),
        }
    }
}

/// Serializable point-in-time copy of a [`Download`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSnapshot {
    pub id: String,
    pub url: String,
    pub format_id: String,
    pub media_kind: MediaKind,
    pub output_path: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub progress: u8,
    pub status: DownloadStatus,
}
