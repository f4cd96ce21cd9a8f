//! Line classification for external process output.
//!
//! yt-dlp (and the ffmpeg it drives) report progress and phase changes
//! as free-text lines. `classify_line` is the pure step function that
//! maps one such line plus the current progress/status to the updated
//! pair. It never fails: anything unparseable degrades to "no change".

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::DownloadStatus;

static PROGRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[download\]\s+(\d{1,3}(?:\.\d+)?)%").unwrap());

/// Applies one line of process output to the current progress/status.
///
/// Progress is extracted first: a `[download]  42.5%` line updates the
/// percentage (integer truncation, clamped to 100). The status chain is
/// then evaluated against the updated progress, first match wins:
/// merge markers, intermediate-file cleanup, active ffmpeg conversion,
/// and finally a mid-transfer fallback to `Downloading`.
pub fn classify_line(line: &str, progress: u8, status: DownloadStatus) -> (u8, DownloadStatus) {
    let mut progress = progress;

    if let Some(caps) = PROGRESS_RE.captures(line) {
        if let Some(pct) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) {
            progress = pct.trunc().min(100.0) as u8;
        }
    }

    let status = if line.contains("Merging formats") || line.contains("[Merger]") {
        DownloadStatus::Merging
    } else if line.contains("Deleting original file") {
        DownloadStatus::CleaningUp
    } else if line.contains("[ffmpeg]") && (line.contains("Converting") || line.contains("Merging"))
    {
        DownloadStatus::Processing
    } else if progress > 0 && progress < 100 {
        DownloadStatus::Downloading
    } else {
        status
    };

    (progress, status)
}
