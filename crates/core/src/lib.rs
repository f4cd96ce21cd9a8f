//! grabbit-core: queued media download management built around yt-dlp.

pub mod config;
pub mod download;
pub mod history;
pub mod journal;
pub mod metrics;
pub mod queue;
pub mod runner;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    JournalConfig, ServerConfig,
};
pub use download::{
    classify_line, Download, DownloadRequest, DownloadSnapshot, DownloadStatus, MediaKind,
};
pub use history::{HistoryError, HistoryRecord, HistoryStore, SqliteHistoryStore};
pub use journal::{create_journal, JournalBuffer, JournalHandle, JournalLine, JournalWriter};
pub use queue::{DownloadQueue, QueueConfig, QueueStatus, QueueUpdateCallback};
pub use runner::{
    build_args, format_selector, RunOutcome, Runner, RunnerConfig, RunnerError, YtDlpRunner,
};
