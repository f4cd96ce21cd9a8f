use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{downloads, handlers, history, journal, middleware, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Downloads
        .route("/downloads", post(downloads::submit_download))
        .route("/downloads", get(downloads::list_downloads))
        .route("/downloads/{id}", delete(downloads::cancel_download))
        // Queue control
        .route("/queue", get(downloads::queue_status))
        .route("/queue/concurrency", put(downloads::set_concurrency))
        // History
        .route("/history", get(history::list_history))
        .route("/history", delete(history::clear_history))
        // Journal
        .route("/journal", get(journal::recent_journal))
        // Live updates
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(axum_middleware::from_fn(middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
