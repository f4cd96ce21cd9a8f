//! Mock runner for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::download::Download;
use crate::runner::{RunOutcome, Runner, RunnerError};

/// Scripted behavior for one download, keyed by title.
#[derive(Debug, Clone, Default)]
struct Script {
    /// Output lines emitted as soon as the run starts.
    lines: Vec<String>,
    /// Fail the spawn itself: the run errors before producing output.
    fail_spawn: bool,
    /// Set once the test releases the run; carries the success flag.
    finished: Option<bool>,
}

/// Mock implementation of the [`Runner`] trait.
///
/// Runs emit their scripted lines and then stay open until the test
/// releases them with [`finish`](MockRunner::finish) or cancels them
/// through the queue, so admission and capacity behavior can be
/// observed deterministically. The order in which runs start is
/// recorded for assertions.
pub struct MockRunner {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    started: Arc<Mutex<Vec<String>>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Creates a new mock runner with no scripted behavior.
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            started: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Scripts the output lines emitted when the given title starts.
    pub fn set_lines(&self, title: &str, lines: Vec<&str>) {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.entry(title.to_string()).or_default();
        script.lines = lines.into_iter().map(String::from).collect();
    }

    /// Makes the run for the given title fail to spawn.
    pub fn fail_spawn(&self, title: &str) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts.entry(title.to_string()).or_default().fail_spawn = true;
    }

    /// Releases the run for the given title with the given success flag.
    pub fn finish(&self, title: &str, success: bool) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts.entry(title.to_string()).or_default().finished = Some(success);
    }

    /// Titles whose runs have started, in start order.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    fn finished_for(&self, title: &str) -> Option<bool> {
        self.scripts
            .lock()
            .unwrap()
            .get(title)
            .and_then(|s| s.finished)
    }
}

#[async_trait]
impl Runner for MockRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        download: Arc<Download>,
        lines: mpsc::Sender<String>,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<RunOutcome, RunnerError> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&download.title)
            .cloned()
            .unwrap_or_default();

        if script.fail_spawn {
            return Err(RunnerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "scripted spawn failure",
            )));
        }

        self.started.lock().unwrap().push(download.title.clone());

        for line in script.lines {
            if lines.send(line).await.is_err() {
                break;
            }
        }

        // Hold the run open until the test releases it or the queue
        // cancels it.
        loop {
            if let Some(success) = self.finished_for(&download.title) {
                return Ok(RunOutcome::Finished {
                    success,
                    exit_code: Some(if success { 0 } else { 1 }),
                });
            }
            tokio::select! {
                _ = cancel.changed() => return Ok(RunOutcome::Canceled),
                _ = tokio::time::sleep(Duration::from_millis(5)) => {}
            }
        }
    }

    async fn validate(&self) -> Result<(), RunnerError> {
        Ok(())
    }
}
