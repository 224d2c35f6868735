//! WebSocket connection lifecycle management.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::http::routes::AppState;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::manager::RoomManager;
use crate::util::id::ConnId;

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.rooms))
}

async fn handle_socket(socket: WebSocket, rooms: RoomManager) {
    let conn = ConnId::new();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    rooms.connect(conn, tx);
    tracing::debug!(%conn, "ws connected");

    // Forward server messages to the socket
    let forward = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to encode server message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(msg) => {
                if !on_frame(&rooms, conn, msg) {
                    break;
                }
            }
            Err(err) => {
                tracing::debug!(%conn, error = %err, "ws read failed");
                break;
            }
        }
    }

    hang_up(&rooms, conn);
    forward.abort();
}

/// Handles one frame. Returns `false` once the peer has closed.
fn on_frame(rooms: &RoomManager, conn: ConnId, msg: Message) -> bool {
    match msg {
        Message::Text(text) => {
            dispatch_text(rooms, conn, &text);
            true
        }
        Message::Close(_) => false,
        Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => true,
    }
}

fn dispatch_text(rooms: &RoomManager, conn: ConnId, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => rooms.handle(conn, msg),
        Err(err) => rooms.reply(
            conn,
            ServerMessage::ServerError { message: format!("Bad message: {}", err) },
        ),
    }
}

/// Close and read errors alike: the seat, if any, enters its grace period.
fn hang_up(rooms: &RoomManager, conn: ConnId) {
    rooms.disconnect(conn);
    tracing::debug!(%conn, "ws closed");
}
