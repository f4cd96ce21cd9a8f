//! History API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use grabbit_core::HistoryRecord;

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Default number of records returned.
const DEFAULT_LIMIT: usize = 100;

/// Maximum number of records returned per request.
const MAX_LIMIT: usize = 1000;

/// Query parameters for listing history.
#[derive(Debug, Deserialize)]
pub struct ListHistoryParams {
    pub limit: Option<usize>,
}

/// Most recent history records, newest first.
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListHistoryParams>,
) -> Result<Json<Vec<HistoryRecord>>, (StatusCode, Json<ErrorResponse>)> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    match state.history().list(limit) {
        Ok(records) => Ok(Json(records)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Remove all history records.
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.history().clear() {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
