//! yt-dlp backed runner implementation.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::download::Download;

use super::command::build_args;
use super::config::RunnerConfig;
use super::error::RunnerError;
use super::traits::{RunOutcome, Runner};

/// Runner that shells out to yt-dlp.
pub struct YtDlpRunner {
    config: RunnerConfig,
}

impl YtDlpRunner {
    /// Creates a new runner with the given configuration.
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Creates a runner with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RunnerConfig::default())
    }

    fn spawn_error(&self, e: std::io::Error) -> RunnerError {
        if e.kind() == std::io::ErrorKind::NotFound {
            RunnerError::YtDlpNotFound {
                path: self.config.yt_dlp_path.clone(),
            }
        } else {
            RunnerError::Io(e)
        }
    }
}

#[async_trait]
impl Runner for YtDlpRunner {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn run(
        &self,
        download: Arc<Download>,
        lines: mpsc::Sender<String>,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<RunOutcome, RunnerError> {
        let args = build_args(&download, &self.config);
        debug!(id = %download.id, "spawning {} {}", self.config.yt_dlp_path.display(), args.join(" "));

        let mut child = Command::new(&self.config.yt_dlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child.stdout.take().expect("stdout should be captured");
        let stderr = child.stderr.take().expect("stderr should be captured");

        // stderr is forwarded into the same channel so the caller sees
        // one combined, line-oriented stream. Once the receiver is gone
        // the task keeps draining so the process never blocks on a full
        // pipe after a soft cancel.
        let stderr_lines = lines.clone();
        let stderr_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr).lines();
            let mut tx = Some(stderr_lines);
            while let Ok(Some(line)) = reader.next_line().await {
                if let Some(sender) = &tx {
                    if sender.send(line).await.is_err() {
                        tx = None;
                    }
                }
            }
        });

        let mut reader = BufReader::new(stdout).lines();
        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    // A dropped sender lands here too: either way the
                    // queue has released this download.
                    if self.config.kill_on_cancel {
                        let _ = child.kill().await;
                        let _ = child.wait().await;
                    } else {
                        // Leave the process to finish on its own with
                        // its output no longer examined: keep draining
                        // stdout so it never sees a closed pipe, and
                        // reap it so it does not linger as a zombie.
                        tokio::spawn(async move {
                            while let Ok(Some(_)) = reader.next_line().await {}
                            let _ = child.wait().await;
                        });
                    }
                    return Ok(RunOutcome::Canceled);
                }
                line = reader.next_line() => match line {
                    Ok(Some(line)) => {
                        if lines.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        debug!(id = %download.id, "output stream error: {}", e);
                        break;
                    }
                }
            }
        }

        let _ = stderr_task.await;
        let status = child.wait().await?;
        Ok(RunOutcome::Finished {
            success: status.success(),
            exit_code: status.code(),
        })
    }

    async fn validate(&self) -> Result<(), RunnerError> {
        let result = Command::new(&self.config.yt_dlp_path)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        if let Err(e) = result {
            return Err(self.spawn_error(e));
        }
        Ok(())
    }
}
