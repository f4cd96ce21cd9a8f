//! Trait definitions for the runner module.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::download::Download;

use super::error::RunnerError;

/// Final outcome of one external process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The output stream ended and the process exited.
    Finished {
        /// Whether the exit code was zero.
        success: bool,
        /// The raw exit code, if the process exited normally.
        exit_code: Option<i32>,
    },
    /// The run was canceled; output is no longer examined.
    Canceled,
}

/// A runner that executes the external download process for one
/// download and streams its combined output line by line.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs the external process for `download`.
    ///
    /// Every line of combined stdout/stderr output is sent through
    /// `lines`. The stream is finite, not restartable, and consumed
    /// exactly once by exactly one worker. When `cancel` fires (or its
    /// sender is dropped) the runner stops reading and returns
    /// [`RunOutcome::Canceled`]. A process that cannot be started at
    /// all is an error with no output lines produced.
    async fn run(
        &self,
        download: Arc<Download>,
        lines: mpsc::Sender<String>,
        cancel: watch::Receiver<bool>,
    ) -> Result<RunOutcome, RunnerError>;

    /// Validates that the runner is properly configured and ready.
    async fn validate(&self) -> Result<(), RunnerError>;
}
