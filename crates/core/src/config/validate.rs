//! Configuration validation.

use crate::queue::{MAX_CONCURRENT, MIN_CONCURRENT};

use super::types::{Config, ConfigError};

/// Validates a loaded configuration.
///
/// Rejects values the runtime would otherwise have to silently correct,
/// so misconfigurations surface at startup instead of at runtime.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Invalid(
            "server.port must be non-zero".to_string(),
        ));
    }

    if config.queue.max_concurrent < MIN_CONCURRENT
        || config.queue.max_concurrent > MAX_CONCURRENT
    {
        return Err(ConfigError::Invalid(format!(
            "queue.max_concurrent must be between {} and {}",
            MIN_CONCURRENT, MAX_CONCURRENT
        )));
    }

    if config.runner.yt_dlp_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(
            "runner.yt_dlp_path must not be empty".to_string(),
        ));
    }

    if config.runner.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(
            "runner.ffmpeg_path must not be empty".to_string(),
        ));
    }

    if config.runner.merge_container.is_empty() {
        return Err(ConfigError::Invalid(
            "runner.merge_container must not be empty".to_string(),
        ));
    }

    if config.journal.capacity == 0 {
        return Err(ConfigError::Invalid(
            "journal.capacity must be non-zero".to_string(),
        ));
    }

    Ok(())
}
