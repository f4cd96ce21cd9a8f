//! Shared application state.

use std::sync::Arc;

use grabbit_core::{Config, DownloadQueue, HistoryStore, JournalBuffer};

use crate::api::WsBroadcaster;

/// Shared application state handed to every handler.
pub struct AppState {
    config: Config,
    queue: DownloadQueue,
    history: Arc<dyn HistoryStore>,
    journal: Arc<JournalBuffer>,
    ws: WsBroadcaster,
}

impl AppState {
    pub fn new(
        config: Config,
        queue: DownloadQueue,
        history: Arc<dyn HistoryStore>,
        journal: Arc<JournalBuffer>,
        ws: WsBroadcaster,
    ) -> Self {
        Self {
            config,
            queue,
            history,
            journal,
            ws,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn queue(&self) -> &DownloadQueue {
        &self.queue
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    pub fn journal(&self) -> &JournalBuffer {
        &self.journal
    }

    pub fn ws(&self) -> &WsBroadcaster {
        &self.ws
    }
}
