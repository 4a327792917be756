//! UseCase: 表示名の設定
//!
//! ゲストが Room 内で一意な表示名を取得する。認証済みユーザーの名前は変更できない。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, Notification, RoomId, RoomRegistry, UsernameError,
};

/// 表示名設定のユースケース
pub struct SetUsernameUseCase {
    registry: Arc<RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SetUsernameUseCase {
    pub fn new(registry: Arc<RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// Claim `requested` as the connection's display name in the room.
    ///
    /// The requester is told the outcome. On success the rest of the room sees
    /// the new name join the chat. Unknown rooms and non-members are ignored.
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        requested: &str,
    ) -> Result<(), UsernameError> {
        let Some(mut room) = self.registry.open(room_id).await else {
            return Err(UsernameError::MemberNotFound);
        };

        let result = room.assign_name(connection_id, requested);
        let reply = match &result {
            Ok(()) => {
                tracing::info!(
                    "Connection {} set username to {} in room '{}'",
                    connection_id,
                    requested,
                    room_id
                );
                Some(Notification::UsernameAccepted)
            }
            Err(UsernameError::Taken(_)) => Some(Notification::UsernameTaken),
            Err(e @ (UsernameError::VerifiedIdentity | UsernameError::Blank)) => {
                Some(Notification::UsernameError {
                    message: e.to_string(),
                })
            }
            Err(UsernameError::MemberNotFound) => None,
        };

        if let Some(reply) = reply {
            if let Err(e) = self.message_pusher.push_to(connection_id, reply).await {
                tracing::warn!("Failed to reply to '{}': {}", connection_id, e);
            }
        }

        if result.is_ok() {
            if let Err(e) = self
                .message_pusher
                .broadcast(
                    room.member_ids_except(connection_id),
                    Notification::UserJoinedChat {
                        display_name: requested.to_string(),
                    },
                )
                .await
            {
                tracing::warn!("Failed to broadcast user-joined-chat: {}", e);
            }
        }
        result
    }
}
