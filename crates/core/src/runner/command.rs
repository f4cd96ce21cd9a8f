//! Command-line construction for yt-dlp invocations.

use crate::download::{Download, MediaKind};

use super::config::RunnerConfig;

/// Effective format selector for a download.
///
/// The sentinel "best" expands to best video+audio with a combined
/// fallback. Explicit video selectors get the best available audio
/// paired in, since high-quality video formats are often video-only.
/// Audio selectors pass through unchanged.
pub fn format_selector(format_id: &str, media_kind: MediaKind) -> String {
    if format_id == "best" {
        "bestvideo+bestaudio/best".to_string()
    } else if media_kind == MediaKind::Video {
        format!("{}+bestaudio", format_id)
    } else {
        format_id.to_string()
    }
}

/// Builds the full yt-dlp argument list for a download.
pub fn build_args(download: &Download, config: &RunnerConfig) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        format_selector(&download.format_id, download.media_kind),
        download.url.clone(),
        "-o".to_string(),
        download.output_path.clone(),
        "--newline".to_string(),
        "--force-overwrites".to_string(),
        "--no-warnings".to_string(),
        "--embed-metadata".to_string(),
        "--ignore-errors".to_string(),
        "--ffmpeg-location".to_string(),
        config.ffmpeg_path.to_string_lossy().to_string(),
    ];

    // Audio downloads keep the container yt-dlp produces; everything
    // else is merged into the configured container.
    if download.media_kind != MediaKind::Audio {
        args.extend([
            "--merge-output-format".to_string(),
            config.merge_container.clone(),
        ]);
    }

    args.extend(config.extra_args.iter().cloned());

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::DownloadRequest;

    fn download(format_id: &str, media_kind: MediaKind) -> Download {
        Download::new(
            "download_1",
            DownloadRequest {
                url: "https://example.com/watch?v=abc".to_string(),
                format_id: format_id.to_string(),
                media_kind,
                output_path: "/downloads/%(title)s.%(ext)s".to_string(),
                title: "Test".to_string(),
            },
        )
    }

    #[test]
    fn test_selector_best() {
        assert_eq!(
            format_selector("best", MediaKind::Video),
            "bestvideo+bestaudio/best"
        );
        assert_eq!(
            format_selector("best", MediaKind::Audio),
            "bestvideo+bestaudio/best"
        );
    }

    #[test]
    fn test_selector_video_gets_best_audio() {
        assert_eq!(format_selector("137", MediaKind::Video), "137+bestaudio");
    }

    #[test]
    fn test_selector_audio_passes_through() {
        assert_eq!(format_selector("140", MediaKind::Audio), "140");
    }

    #[test]
    fn test_build_args_video() {
        let config = RunnerConfig::default();
        let args = build_args(&download("137", MediaKind::Video), &config);

        assert_eq!(args[0], "-f");
        assert_eq!(args[1], "137+bestaudio");
        assert_eq!(args[2], "https://example.com/watch?v=abc");
        assert!(args.contains(&"-o".to_string()));
        assert!(args.contains(&"/downloads/%(title)s.%(ext)s".to_string()));
        assert!(args.contains(&"--newline".to_string()));
        assert!(args.contains(&"--embed-metadata".to_string()));
        assert!(args.contains(&"--ignore-errors".to_string()));
        assert!(args.contains(&"--ffmpeg-location".to_string()));
        assert!(args.contains(&"--merge-output-format".to_string()));
        assert!(args.contains(&"mkv".to_string()));
    }

    #[test]
    fn test_build_args_audio_omits_merge_format() {
        let config = RunnerConfig::default();
        let args = build_args(&download("140", MediaKind::Audio), &config);

        assert_eq!(args[1], "140");
        assert!(!args.contains(&"--merge-output-format".to_string()));
        assert!(!args.contains(&"mkv".to_string()));
    }

    #[test]
    fn test_build_args_custom_merge_container() {
        let config = RunnerConfig {
            merge_container: "mp4".to_string(),
            ..RunnerConfig::default()
        };
        let args = build_args(&download("best", MediaKind::Video), &config);
        assert!(args.contains(&"--merge-output-format".to_string()));
        assert!(args.contains(&"mp4".to_string()));
    }

    #[test]
    fn test_build_args_appends_extra_args() {
        let config = RunnerConfig {
            extra_args: vec!["--no-playlist".to_string(), "-4".to_string()],
            ..RunnerConfig::default()
        };
        let args = build_args(&download("best", MediaKind::Video), &config);
        assert_eq!(args[args.len() - 2], "--no-playlist");
        assert_eq!(args[args.len() - 1], "-4");
    }
}
