//! Download API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use grabbit_core::{DownloadRequest, DownloadSnapshot, MediaKind, QueueStatus};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Request body for submitting a download.
#[derive(Debug, Deserialize)]
pub struct SubmitDownloadBody {
    /// Source URL.
    pub url: String,
    /// Format selector; defaults to "best".
    #[serde(default = "default_format_id")]
    pub format_id: String,
    /// Kind of media being fetched.
    pub media_kind: MediaKind,
    /// Output path template handed to the external tool.
    pub output_path: String,
    /// Display title.
    pub title: String,
}

fn default_format_id() -> String {
    "best".to_string()
}

/// Response for listing downloads.
#[derive(Debug, Serialize)]
pub struct ListDownloadsResponse {
    pub active: Vec<DownloadSnapshot>,
    pub queued: Vec<DownloadSnapshot>,
    pub max_concurrent: usize,
}

/// Request body for updating the concurrency limit.
#[derive(Debug, Deserialize)]
pub struct SetConcurrencyBody {
    pub max_concurrent: usize,
}

/// Submit a new download.
pub async fn submit_download(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitDownloadBody>,
) -> Result<(StatusCode, Json<DownloadSnapshot>), (StatusCode, Json<ErrorResponse>)> {
    if body.url.trim().is_empty() {
        return Err(bad_request("url must not be empty"));
    }
    if body.output_path.trim().is_empty() {
        return Err(bad_request("output_path must not be empty"));
    }

    let download = state.queue().submit(DownloadRequest {
        url: body.url,
        format_id: body.format_id,
        media_kind: body.media_kind,
        output_path: body.output_path,
        title: body.title,
    });

    Ok((StatusCode::CREATED, Json(download.snapshot())))
}

/// Point-in-time snapshots of the active set and pending queue.
pub async fn list_downloads(State(state): State<Arc<AppState>>) -> Json<ListDownloadsResponse> {
    let active = state.queue().active().iter().map(|d| d.snapshot()).collect();
    let queued = state.queue().queued().iter().map(|d| d.snapshot()).collect();
    let max_concurrent = state.queue().status().max_concurrent;

    Json(ListDownloadsResponse {
        active,
        queued,
        max_concurrent,
    })
}

/// Cancel a download by id.
///
/// Unknown or already-terminal ids map to 404; the queue itself treats
/// them as a silent no-op.
pub async fn cancel_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.queue().cancel(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Current queue counters.
pub async fn queue_status(State(state): State<Arc<AppState>>) -> Json<QueueStatus> {
    Json(state.queue().status())
}

/// Update the concurrency limit (clamped to 1..=10) and return the
/// resulting queue counters.
pub async fn set_concurrency(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetConcurrencyBody>,
) -> Json<QueueStatus> {
    state.queue().set_max_concurrent(body.max_concurrent);
    Json(state.queue().status())
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
