//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `PusherChannel` を管理
//! - 接続へのイベント送信（push_to, broadcast）
//!
//! WebSocket 自体は UI 層（`ui::handler::websocket`）が持ち、チャンネルの受信側から
//! 読み出した `Notification` を JSON にして書き込む。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, Notification, PusherChannel};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// Key: connection id, Value: the connection's outbound channel
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { clients }
    }

    pub async fn connected_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(connection_id).is_some() {
            tracing::debug!("Connection '{}' unregistered from MessagePusher", connection_id);
        }
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        notification: Notification,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        sender
            .send(notification)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        notification: Notification,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => {
                    if let Err(e) = sender.send(notification.clone()) {
                        tracing::warn!("Failed to push to connection '{}': {}", target, e);
                    }
                }
                None => {
                    tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
                }
            }
        }

        Ok(())
    }
}
