//! WebSocket handler for live reload.
//!
//! A connection registers itself with the subscriber registry, forwards
//! reload notifications to the browser, and reads inbound frames only to
//! notice when the peer goes away.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;

use super::RELOAD_MESSAGE;
use crate::state::AppState;

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle the lifecycle of a single WebSocket connection.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let Some(registry) = &state.registry else {
        // The route is only mounted when live reload is enabled.
        return;
    };

    let (id, mut events) = registry.register();
    tracing::debug!(subscriber = id, total = registry.count(), "WebSocket client connected");

    loop {
        tokio::select! {
            // Forward reload notifications to the client
            event = events.recv() => {
                match event {
                    Some(_) => {
                        if socket.send(Message::Text(RELOAD_MESSAGE.into())).await.is_err() {
                            break;
                        }
                    }
                    // The registry already pruned this subscriber
                    None => break,
                }
            }
            // Inbound frames carry no meaning; they only prove liveness
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }

    registry.remove(id);
    tracing::debug!(subscriber = id, "WebSocket client closed");
}
