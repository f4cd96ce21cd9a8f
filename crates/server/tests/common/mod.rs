//! Common test utilities for endpoint testing with mocks.
//!
//! Builds the router in-process with a mock runner and history store
//! injected, so no yt-dlp binary or database file is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use grabbit_core::testing::{MockHistoryStore, MockRunner};
use grabbit_core::{create_journal, Config, DownloadQueue, HistoryStore, JournalBuffer, Runner};
use grabbit_server::api::{create_router, WsBroadcaster};
use grabbit_server::state::AppState;

/// Test fixture with fully controllable mocks behind a real router.
pub struct TestFixture {
    pub router: Router,
    pub queue: DownloadQueue,
    pub runner: Arc<MockRunner>,
    pub history: Arc<MockHistoryStore>,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Creates a fixture with default configuration.
    ///
    /// Must be called from within a tokio runtime: the journal writer
    /// is spawned as a background task.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a fixture with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let runner = Arc::new(MockRunner::new());
        let history = Arc::new(MockHistoryStore::new());
        let journal_buffer = Arc::new(JournalBuffer::new(config.journal.capacity));
        let (journal, writer) = create_journal(Arc::clone(&journal_buffer), 256);
        tokio::spawn(writer.run());

        let queue = DownloadQueue::new(
            config.queue.clone(),
            Arc::clone(&runner) as Arc<dyn Runner>,
            Arc::clone(&history) as Arc<dyn HistoryStore>,
            journal,
        );

        let ws = WsBroadcaster::default();
        {
            let broadcaster = ws.clone();
            queue.set_update_callback(Arc::new(move || broadcaster.queue_updated()));
        }

        let state = Arc::new(AppState::new(
            config,
            queue.clone(),
            Arc::clone(&history) as Arc<dyn HistoryStore>,
            journal_buffer,
            ws,
        ));

        Self {
            router: create_router(state),
            queue,
            runner,
            history,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request builds"))
            .await
            .expect("request succeeds");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).to_string())
            })
        };

        TestResponse { status, body }
    }
}

/// Polls `condition` until it holds or a timeout expires.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("condition not met within timeout");
}
