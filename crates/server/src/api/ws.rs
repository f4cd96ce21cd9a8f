//! WebSocket support for live queue updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL};
use crate::state::AppState;

/// Interval between heartbeat messages.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Internal broadcast event. Carries no payload; the socket handler
/// reads fresh queue counters at send time.
#[derive(Debug, Clone)]
enum WsEvent {
    QueueChanged,
}

/// WebSocket message sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// The queue or active set changed shape.
    QueueUpdate {
        active: usize,
        queued: usize,
        max_concurrent: usize,
    },
    /// Server heartbeat, sent periodically to keep the connection alive.
    Heartbeat { timestamp: i64 },
}

/// Broadcaster for WebSocket events using a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsEvent>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Signal that the queue's structure changed.
    ///
    /// Send errors are ignored: they just mean no one is listening.
    pub fn queue_updated(&self) {
        let _ = self.sender.send(WsEvent::QueueChanged);
    }

    fn subscribe(&self) -> broadcast::Receiver<WsEvent> {
        self.sender.subscribe()
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!("websocket client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut events = state.ws().subscribe();
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(WsEvent::QueueChanged) => {
                    let status = state.queue().status();
                    let msg = WsMessage::QueueUpdate {
                        active: status.active,
                        queued: status.queued,
                        max_concurrent: status.max_concurrent,
                    };
                    if send_message(&mut sender, &msg).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagged behind queue events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = heartbeat.tick() => {
                let msg = WsMessage::Heartbeat {
                    timestamp: chrono::Utc::now().timestamp(),
                };
                if send_message(&mut sender, &msg).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                // Clients only listen; anything else is ignored.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("websocket error: {}", e);
                    break;
                }
            }
        }
    }

    WS_CONNECTIONS_ACTIVE.dec();
    info!("websocket client disconnected");
}

async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &WsMessage,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(msg).expect("ws message serializes");
    sender.send(Message::Text(text.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_update_serialization() {
        let msg = WsMessage::QueueUpdate {
            active: 2,
            queued: 3,
            max_concurrent: 4,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"queue_update\""));
        assert!(json.contains("\"active\":2"));
    }

    #[test]
    fn test_broadcast_without_subscribers_is_ok() {
        let broadcaster = WsBroadcaster::default();
        broadcaster.queue_updated();
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let broadcaster = WsBroadcaster::default();
        let mut rx = broadcaster.subscribe();
        broadcaster.queue_updated();
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, WsEvent::QueueChanged));
    }
}
