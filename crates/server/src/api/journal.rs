//! Journal API handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use grabbit_core::JournalLine;

use crate::state::AppState;

/// Default number of lines returned.
const DEFAULT_LIMIT: usize = 200;

/// Maximum number of lines returned per request.
const MAX_LIMIT: usize = 2000;

/// Query parameters for the journal.
#[derive(Debug, Deserialize)]
pub struct JournalParams {
    pub limit: Option<usize>,
}

/// Most recent journal lines, oldest first.
pub async fn recent_journal(
    State(state): State<Arc<AppState>>,
    Query(params): Query<JournalParams>,
) -> Json<Vec<JournalLine>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    Json(state.journal().recent(limit))
}
