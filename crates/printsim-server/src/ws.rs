//! Websocket upgrade endpoint: forwards broadcast event frames to the
//! client and dispatches incoming text frames as control commands.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use crate::control::handle_command;
use crate::state::AppState;

pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut events_rx = state.events_tx.subscribe();

    let mut forward_task = tokio::spawn(async move {
        loop {
            match events_rx.recv().await {
                Ok(frame) => {
                    if sender.send(Message::Text(frame.to_string())).await.is_err() {
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let command_state = Arc::clone(&state);
    let mut command_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Text(text) = message {
                let reply = handle_command(&command_state, &text);
                command_state.broadcast(reply);
            }
        }
    });

    tokio::select! {
        _ = &mut forward_task => command_task.abort(),
        _ = &mut command_task => forward_task.abort(),
    }
}
