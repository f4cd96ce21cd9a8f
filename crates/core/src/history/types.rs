//! History record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::download::{Download, DownloadStatus, MediaKind};

/// One persisted history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub url: String,
    pub title: String,
    pub format_id: String,
    pub media_kind: MediaKind,
    pub output_path: String,
    pub status: DownloadStatus,
    pub finished_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Builds the record for a download's terminal transition.
    pub fn from_download(download: &Download) -> Self {
        Self {
            url: download.url.clone(),
            title: download.title.clone(),
            format_id: download.format_id.clone(),
            media_kind: download.media_kind,
            output_path: download.output_path.clone(),
            status: download.status(),
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::DownloadRequest;

    #[test]
    fn test_from_download_captures_terminal_status() {
        let download = Download::new(
            "download_3",
            DownloadRequest {
                url: "https://example.com/watch?v=xyz".to_string(),
                format_id: "140".to_string(),
                media_kind: MediaKind::Audio,
                output_path: "/music/%(title)s.%(ext)s".to_string(),
                title: "Some Song".to_string(),
            },
        );
        download.set_status(DownloadStatus::Failed);

        let record = HistoryRecord::from_download(&download);
        assert_eq!(record.url, "https://example.com/watch?v=xyz");
        assert_eq!(record.title, "Some Song");
        assert_eq!(record.media_kind, MediaKind::Audio);
        assert_eq!(record.status, DownloadStatus::Failed);
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let record = HistoryRecord {
            url: "https://example.com/a".to_string(),
            title: "A".to_string(),
            format_id: "best".to_string(),
            media_kind: MediaKind::Video,
            output_path: "/downloads/a.mkv".to_string(),
            status: DownloadStatus::Completed,
            finished_at: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: HistoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
