//! External process runner.
//!
//! Builds the yt-dlp command line for a download, spawns the process,
//! and exposes its combined stdout/stderr as a finite, line-oriented
//! stream plus a final exit status. The [`Runner`] trait is the seam
//! that lets the queue run against a mock in tests.

mod command;
mod config;
mod error;
mod traits;
mod ytdlp;

pub use command::{build_args, format_selector};
pub use config::RunnerConfig;
pub use error::RunnerError;
pub use traits::{RunOutcome, Runner};
pub use ytdlp::YtDlpRunner;
