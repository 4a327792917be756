//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, header},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionIdentity, Notification, RoomId},
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Access token. Falls back to the `Authorization: Bearer` header.
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let credential = query.token.or_else(|| bearer_token(&headers));

    // 認証の失敗で接続を拒否することはない
    let identity = state
        .resolve_identity_usecase
        .execute(credential.as_deref())
        .await;

    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

/// Spawns a task that receives notifications from the rx channel and writes
/// them to the WebSocket as JSON text frames.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            let json = match serde_json::to_string(&ServerEvent::from(notification)) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: ConnectionIdentity) {
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_client(connection_id.clone(), tx)
        .await;
    tracing::info!(
        "Connection {} opened ({})",
        connection_id,
        if identity.is_verified() { "verified" } else { "guest" }
    );

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();

    // Events from one connection are handled one at a time, in arrival order
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        dispatch(&state_clone, &connection_id_clone, &identity, event).await
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Ignoring malformed event from {}: {}",
                            connection_id_clone,
                            e
                        );
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", connection_id_clone);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.disconnect_usecase.execute(&connection_id).await;
}

async fn dispatch(
    state: &AppState,
    connection_id: &ConnectionId,
    identity: &ConnectionIdentity,
    event: ClientEvent,
) {
    match event {
        ClientEvent::JoinRoom { room_id } => {
            state
                .join_room_usecase
                .execute(&RoomId::from(room_id), connection_id, identity)
                .await;
        }
        ClientEvent::LeaveRoom { room_id } => {
            state
                .leave_room_usecase
                .execute(&RoomId::from(room_id), connection_id)
                .await;
        }
        ClientEvent::SetUsername { room_id, username } => {
            if let Err(e) = state
                .set_username_usecase
                .execute(&RoomId::from(room_id), connection_id, &username)
                .await
            {
                tracing::debug!("Username request from {} refused: {}", connection_id, e);
            }
        }
        ClientEvent::SendMessage { room_id, message } => {
            state
                .send_chat_message_usecase
                .execute(&RoomId::from(room_id), connection_id, message)
                .await;
        }
        ClientEvent::CodeChange {
            room_id,
            field,
            content,
        } => {
            state
                .edit_document_usecase
                .execute(&RoomId::from(room_id), connection_id, field, content)
                .await;
        }
    }
}
