//! HTTP/WebSocket API.

mod downloads;
mod handlers;
mod history;
mod journal;
mod middleware;
mod routes;
mod ws;

pub use routes::create_router;
pub use ws::{WsBroadcaster, WsMessage};
