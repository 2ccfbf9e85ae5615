//! WebSocket endpoint streaming bookmark events to connected observers.
//!
//! Send-only from the server's perspective: inbound frames are drained and
//! ignored apart from close. Delivery is best-effort; a lagging receiver
//! drops events and keeps going.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// Upgrade to a WebSocket and stream events until either side disconnects.
pub async fn events_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    tracing::debug!("events WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection lifecycle.
///
/// Spawns two concurrent tasks: one streaming broadcast events to the
/// client, one draining inbound frames so close handshakes work.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.events().subscribe();

    let mut send_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let message = match serde_json::to_string(&event) {
                        Ok(json) => Message::Text(json.into()),
                        Err(e) => {
                            tracing::error!(error = %e, "failed to serialize event");
                            continue;
                        }
                    };

                    if sender.send(message).await.is_err() {
                        // Client disconnected
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "events receiver lagged; frames dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    // Whichever task finishes first tears the other one down.
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    tracing::debug!("events WebSocket connection closed");
}
