//! Error types for the runner module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running the external process.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// yt-dlp binary not found.
    #[error("yt-dlp not found at path: {path}")]
    YtDlpNotFound { path: PathBuf },

    /// I/O error while spawning or driving the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
