//! UseCase: チャットメッセージの中継
//!
//! 表示名を持つメンバーのメッセージを、送信者を含む Room 全体に配信する。
//! メッセージは保存しない。

use std::sync::Arc;

use tsudoi_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, MessagePusher, Notification, RoomId, RoomRegistry, Timestamp,
};

/// チャット中継のユースケース
pub struct SendChatMessageUseCase {
    registry: Arc<RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendChatMessageUseCase {
    pub fn new(
        registry: Arc<RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// Relay a chat message to the whole room, sender included.
    ///
    /// Returns the relayed message, or `None` when the room is unknown or the
    /// sender has no display name yet.
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        body: String,
    ) -> Option<ChatMessage> {
        let room = self.registry.open(room_id).await?;
        let display_name = room.member(connection_id)?.display_name.clone()?;

        let message = ChatMessage {
            display_name,
            body,
            sent_at: Timestamp::new(self.clock.now_millis()),
            connection_id: connection_id.clone(),
        };
        tracing::debug!(
            "Message from {} in room '{}': {}",
            message.display_name,
            room_id,
            message.body
        );

        if let Err(e) = self
            .message_pusher
            .broadcast(room.member_ids(), Notification::ChatMessage(message.clone()))
            .await
        {
            tracing::warn!("Failed to broadcast chat-message: {}", e);
        }
        Some(message)
    }
}
