use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::AppState;

/// Dashboard feed: pushes `motivation`, `status_changed` and `mood_changed`
/// events as JSON text frames.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let Some(rx) = state.ws_tx.as_ref().map(|tx| tx.subscribe()) else {
        tracing::warn!("WebSocket requested but broadcast channel is disabled");
        return (StatusCode::SERVICE_UNAVAILABLE, "Live updates unavailable").into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

async fn handle_socket(socket: WebSocket, mut rx: broadcast::Receiver<String>) {
    let connection_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();

    tracing::debug!(connection_id = %connection_id, "WebSocket connection established");

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    if sender.send(Message::Text(msg)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(connection_id = %connection_id, skipped, "WebSocket client lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Clients only listen; incoming frames are logged and otherwise ignored.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    tracing::debug!(connection_id = %connection_id, message = %text, "WebSocket message received");
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!(connection_id = %connection_id, "WebSocket connection closed");
}
