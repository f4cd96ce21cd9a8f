//! Download queue implementation.
//!
//! All shared bookkeeping (pending queue, active set, concurrency
//! limit, id counter) lives behind a single mutex and is reached only
//! through the queue's public operations. Critical sections never
//! await; workers, observer callbacks and collaborator calls all run
//! outside the lock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::download::{classify_line, Download, DownloadRequest, DownloadStatus};
use crate::history::{HistoryRecord, HistoryStore};
use crate::journal::JournalHandle;
use crate::metrics;
use crate::runner::{RunOutcome, Runner};

use super::config::{QueueConfig, MAX_CONCURRENT, MIN_CONCURRENT};
use super::types::{QueueStatus, QueueUpdateCallback};

/// Buffer size for each worker's line channel.
const LINE_BUFFER: usize = 64;

/// The download queue.
///
/// Cheaply cloneable; all clones operate on the same shared state.
pub struct DownloadQueue {
    shared: Arc<Shared>,
}

impl Clone for DownloadQueue {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared {
    runner: Arc<dyn Runner>,
    history: Arc<dyn HistoryStore>,
    journal: JournalHandle,
    update_callback: RwLock<Option<QueueUpdateCallback>>,
    state: Mutex<QueueState>,
}

struct QueueState {
    queue: VecDeque<Arc<Download>>,
    active: Vec<ActiveEntry>,
    max_concurrent: usize,
    next_id: u64,
}

/// An admitted download bound to a running worker.
struct ActiveEntry {
    download: Arc<Download>,
    cancel_tx: watch::Sender<bool>,
}

/// A download admitted but not yet launched; workers are spawned only
/// after the state lock is released.
type Admitted = (Arc<Download>, watch::Receiver<bool>);

impl DownloadQueue {
    /// Creates a new queue.
    ///
    /// The configured concurrency limit is clamped to 1..=10.
    pub fn new(
        config: QueueConfig,
        runner: Arc<dyn Runner>,
        history: Arc<dyn HistoryStore>,
        journal: JournalHandle,
    ) -> Self {
        let max_concurrent = config.max_concurrent.clamp(MIN_CONCURRENT, MAX_CONCURRENT);
        Self {
            shared: Arc::new(Shared {
                runner,
                history,
                journal,
                update_callback: RwLock::new(None),
                state: Mutex::new(QueueState {
                    queue: VecDeque::new(),
                    active: Vec::new(),
                    max_concurrent,
                    next_id: 0,
                }),
            }),
        }
    }

    /// Registers the observer called after every structural change.
    pub fn set_update_callback(&self, callback: QueueUpdateCallback) {
        *self.shared.update_callback.write().unwrap() = Some(callback);
    }

    /// Submits a new download.
    ///
    /// The download is assigned the next counter-derived id, appended
    /// to the tail of the queue and admitted immediately if capacity
    /// allows. Returns the shared download record.
    pub fn submit(&self, request: DownloadRequest) -> Arc<Download> {
        let (download, admitted) = {
            let mut state = self.shared.state.lock().unwrap();
            state.next_id += 1;
            let download = Arc::new(Download::new(
                format!("download_{}", state.next_id),
                request,
            ));
            download.set_status(DownloadStatus::Queued);
            state.queue.push_back(Arc::clone(&download));
            let admitted = Self::admit(&mut state);
            Self::sync_gauges(&state);
            (download, admitted)
        };

        metrics::DOWNLOADS_SUBMITTED_TOTAL.inc();
        self.shared.journal.try_emit(
            Some(download.id.as_str()),
            format!("[queue] added to queue: {}", download.title),
        );
        info!(id = %download.id, title = %download.title, "download queued");

        Self::launch(&self.shared, admitted);
        Self::notify(&self.shared);
        download
    }

    /// Cancels a download by id.
    ///
    /// An active download is removed from the active set and its worker
    /// signaled; a queued download is removed without ever starting.
    /// Unknown or already-terminal ids are ignored. Returns whether a
    /// download was actually canceled.
    pub fn cancel(&self, id: &str) -> bool {
        enum Canceled {
            Active(Arc<Download>),
            Queued(Arc<Download>),
        }

        let (canceled, admitted) = {
            let mut state = self.shared.state.lock().unwrap();
            if let Some(pos) = state.active.iter().position(|e| e.download.id == id) {
                let entry = state.active.remove(pos);
                entry.download.set_status(DownloadStatus::Canceled);
                let _ = entry.cancel_tx.send(true);
                let admitted = Self::admit(&mut state);
                Self::sync_gauges(&state);
                (Some(Canceled::Active(entry.download)), admitted)
            } else if let Some(pos) = state.queue.iter().position(|d| d.id == id) {
                let download = state.queue.remove(pos).expect("position is in bounds");
                download.set_status(DownloadStatus::Canceled);
                Self::sync_gauges(&state);
                (Some(Canceled::Queued(download)), Vec::new())
            } else {
                (None, Vec::new())
            }
        };

        match canceled {
            Some(Canceled::Active(download)) => {
                metrics::DOWNLOADS_FINISHED_TOTAL
                    .with_label_values(&["canceled"])
                    .inc();
                self.shared.journal.try_emit(
                    Some(download.id.as_str()),
                    format!("[download] canceled active download: {}", download.id),
                );
                info!(id = %download.id, "active download canceled");
                Self::record_history(&self.shared, &download);
                Self::launch(&self.shared, admitted);
                Self::notify(&self.shared);
                true
            }
            Some(Canceled::Queued(download)) => {
                metrics::DOWNLOADS_FINISHED_TOTAL
                    .with_label_values(&["canceled"])
                    .inc();
                self.shared.journal.try_emit(
                    Some(download.id.as_str()),
                    format!("[queue] removed from queue: {}", download.id),
                );
                info!(id = %download.id, "queued download canceled");
                Self::record_history(&self.shared, &download);
                Self::notify(&self.shared);
                true
            }
            None => {
                debug!(id, "cancel ignored: unknown or already finished");
                false
            }
        }
    }

    /// Updates the concurrency limit, clamped to 1..=10.
    ///
    /// Raising the limit admits further queued downloads immediately;
    /// lowering it never preempts downloads that are already running.
    pub fn set_max_concurrent(&self, limit: usize) {
        let limit = limit.clamp(MIN_CONCURRENT, MAX_CONCURRENT);
        let admitted = {
            let mut state = self.shared.state.lock().unwrap();
            state.max_concurrent = limit;
            let admitted = Self::admit(&mut state);
            Self::sync_gauges(&state);
            admitted
        };

        self.shared.journal.try_emit(
            None,
            format!("[queue] max concurrent downloads set to {}", limit),
        );
        info!(limit, "max concurrent downloads updated");

        Self::launch(&self.shared, admitted);
        Self::notify(&self.shared);
    }

    /// Point-in-time snapshot of the active set.
    pub fn active(&self) -> Vec<Arc<Download>> {
        let state = self.shared.state.lock().unwrap();
        state
            .active
            .iter()
            .map(|e| Arc::clone(&e.download))
            .collect()
    }

    /// Point-in-time snapshot of the pending queue.
    pub fn queued(&self) -> Vec<Arc<Download>> {
        let state = self.shared.state.lock().unwrap();
        state.queue.iter().cloned().collect()
    }

    /// Current queue counters.
    pub fn status(&self) -> QueueStatus {
        let state = self.shared.state.lock().unwrap();
        QueueStatus {
            active: state.active.len(),
            queued: state.queue.len(),
            max_concurrent: state.max_concurrent,
        }
    }

    /// Marks every active download canceled and signals its worker.
    ///
    /// Queued downloads are left untouched; call sites that want a full
    /// stop should drain the queue through `cancel` first.
    pub fn shutdown(&self) {
        let canceled: Vec<Arc<Download>> = {
            let mut state = self.shared.state.lock().unwrap();
            let entries: Vec<ActiveEntry> = state.active.drain(..).collect();
            for entry in &entries {
                entry.download.set_status(DownloadStatus::Canceled);
                let _ = entry.cancel_tx.send(true);
            }
            Self::sync_gauges(&state);
            entries.into_iter().map(|e| e.download).collect()
        };

        for download in &canceled {
            metrics::DOWNLOADS_FINISHED_TOTAL
                .with_label_values(&["canceled"])
                .inc();
            self.shared.journal.try_emit(
                Some(download.id.as_str()),
                format!("[download] canceled on shutdown: {}", download.id),
            );
            Self::record_history(&self.shared, download);
        }

        if !canceled.is_empty() {
            info!(count = canceled.len(), "active downloads canceled on shutdown");
            Self::notify(&self.shared);
        }
    }

    /// Moves queued downloads into the active set until the capacity
    /// limit is reached. Strict FIFO: only ever pops the head. Must be
    /// called with the state lock held; the returned workers are
    /// started by `launch` after the lock is released.
    fn admit(state: &mut QueueState) -> Vec<Admitted> {
        let mut admitted = Vec::new();
        while state.active.len() < state.max_concurrent {
            let Some(download) = state.queue.pop_front() else {
                break;
            };
            download.set_status(DownloadStatus::Downloading);
            let (cancel_tx, cancel_rx) = watch::channel(false);
            state.active.push(ActiveEntry {
                download: Arc::clone(&download),
                cancel_tx,
            });
            admitted.push((download, cancel_rx));
        }
        admitted
    }

    /// Spawns one detached worker per admitted download.
    fn launch(shared: &Arc<Shared>, admitted: Vec<Admitted>) {
        for (download, cancel_rx) in admitted {
            shared.journal.try_emit(
                Some(download.id.as_str()),
                format!("[download] starting: {}", download.title),
            );
            info!(id = %download.id, title = %download.title, "download started");

            let shared = Arc::clone(shared);
            tokio::spawn(async move {
                Self::run_worker(shared, download, cancel_rx).await;
            });
        }
    }

    /// Drives one download: streams the runner's output through the
    /// classifier and performs completion handling when the stream
    /// ends.
    async fn run_worker(
        shared: Arc<Shared>,
        download: Arc<Download>,
        cancel_rx: watch::Receiver<bool>,
    ) {
        let (tx, mut rx) = mpsc::channel(LINE_BUFFER);
        let run = shared.runner.run(Arc::clone(&download), tx, cancel_rx);

        let consume = async {
            while let Some(line) = rx.recv().await {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                shared.journal.try_emit(Some(download.id.as_str()), line.to_string());
                let (progress, status) =
                    classify_line(line, download.progress(), download.status());
                download.set_progress(progress);
                download.set_status(status);
            }
        };

        let (outcome, ()) = tokio::join!(run, consume);

        match outcome {
            Ok(RunOutcome::Finished { success, exit_code }) => {
                Self::finish(&shared, &download, success, exit_code);
            }
            Ok(RunOutcome::Canceled) => {
                // cancel() already removed the entry, recorded history
                // and re-ran admission; the worker just stops examining
                // output.
                debug!(id = %download.id, "worker stopped after cancellation");
            }
            Err(e) => {
                shared.journal.try_emit(
                    Some(download.id.as_str()),
                    format!("[error] failed to start download process: {}", e),
                );
                warn!(id = %download.id, "runner error: {}", e);
                Self::finish(&shared, &download, false, None);
            }
        }
    }

    /// Completion handling for a worker whose output stream ended.
    fn finish(
        shared: &Arc<Shared>,
        download: &Arc<Download>,
        success: bool,
        exit_code: Option<i32>,
    ) {
        let admitted = {
            let mut state = shared.state.lock().unwrap();
            let Some(pos) = state.active.iter().position(|e| e.download.id == download.id)
            else {
                // Canceled while the stream was ending; cancel() has
                // already done the bookkeeping.
                return;
            };
            state.active.remove(pos);
            if success {
                download.set_progress(100);
            }
            download.set_status(if success {
                DownloadStatus::Completed
            } else {
                DownloadStatus::Failed
            });
            let admitted = Self::admit(&mut state);
            Self::sync_gauges(&state);
            admitted
        };

        if success {
            metrics::DOWNLOADS_FINISHED_TOTAL
                .with_label_values(&["completed"])
                .inc();
            shared.journal.try_emit(
                Some(download.id.as_str()),
                format!("[download] completed: {}", download.title),
            );
            info!(id = %download.id, "download completed");
        } else {
            metrics::DOWNLOADS_FINISHED_TOTAL
                .with_label_values(&["failed"])
                .inc();
            let message = match exit_code {
                Some(code) => format!(
                    "[download] failed: {} (exit code: {})",
                    download.title, code
                ),
                None => format!("[download] failed: {}", download.title),
            };
            shared.journal.try_emit(Some(download.id.as_str()), message);
            warn!(id = %download.id, exit_code = ?exit_code, "download failed");
        }

        Self::record_history(shared, download);
        Self::launch(shared, admitted);
        Self::notify(shared);
    }

    fn record_history(shared: &Shared, download: &Download) {
        let record = HistoryRecord::from_download(download);
        if let Err(e) = shared.history.record(&record) {
            warn!(id = %download.id, "failed to record history: {}", e);
        }
    }

    fn notify(shared: &Shared) {
        let callback = shared.update_callback.read().unwrap().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn sync_gauges(state: &QueueState) {
        metrics::sync_queue_gauges(state.active.len(), state.queue.len(), state.max_concurrent);
    }
}
