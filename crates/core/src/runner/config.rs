//! Runner configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the yt-dlp runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_yt_dlp_path")]
    pub yt_dlp_path: PathBuf,

    /// Path to the ffmpeg binary, handed to yt-dlp via --ffmpeg-location.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Container format requested via --merge-output-format for
    /// non-audio downloads.
    #[serde(default = "default_merge_container")]
    pub merge_container: String,

    /// Extra arguments appended to every invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Kill the external process when its download is canceled.
    ///
    /// When false (the default) a canceled download's process is left
    /// to finish in the background and only its output stops being
    /// examined.
    #[serde(default)]
    pub kill_on_cancel: bool,
}

fn default_yt_dlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_merge_container() -> String {
    "mkv".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: default_yt_dlp_path(),
            ffmpeg_path: default_ffmpeg_path(),
            merge_container: default_merge_container(),
            extra_args: Vec::new(),
            kill_on_cancel: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.yt_dlp_path, PathBuf::from("yt-dlp"));
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.merge_container, "mkv");
        assert!(config.extra_args.is_empty());
        assert!(!config.kill_on_cancel);
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            yt_dlp_path = "/usr/local/bin/yt-dlp"
        "#;
        let config: RunnerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.yt_dlp_path, PathBuf::from("/usr/local/bin/yt-dlp"));
        assert_eq!(config.merge_container, "mkv");
        assert!(!config.kill_on_cancel);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            yt_dlp_path = "/opt/yt-dlp"
            ffmpeg_path = "/opt/ffmpeg"
            merge_container = "mp4"
            extra_args = ["--no-playlist"]
            kill_on_cancel = true
        "#;
        let config: RunnerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg"));
        assert_eq!(config.merge_container, "mp4");
        assert_eq!(config.extra_args, vec!["--no-playlist".to_string()]);
        assert!(config.kill_on_cancel);
    }
}
