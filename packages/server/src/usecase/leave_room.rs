//! UseCase: ルーム退出処理
//!
//! 明示的な退出と切断の両方から使われる。メンバーがいなくなった Room は
//! レジストリから削除され、ドキュメントと予約済みの名前も破棄される。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, Notification, RegistryGuard, RoomId, RoomRegistry,
};

use super::persistence::PersistenceBridge;

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    persistence: Arc<PersistenceBridge>,
}

impl LeaveRoomUseCase {
    pub fn new(
        registry: Arc<RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        persistence: Arc<PersistenceBridge>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            persistence,
        }
    }

    /// Remove a connection from a room.
    ///
    /// Returns `false` (and does nothing) when the room or the member is absent.
    pub async fn execute(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let mut registry = self.registry.lock().await;
        self.leave_locked(&mut registry, room_id, connection_id)
            .await
    }

    /// Same as [`execute`](Self::execute) for a caller already holding the registry lock.
    pub(crate) async fn leave_locked(
        &self,
        registry: &mut RegistryGuard<'_>,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> bool {
        let Some(mut room) = registry.open(room_id).await else {
            return false;
        };
        let Some(member) = room.remove_member(connection_id) else {
            return false;
        };

        if let Some(display_name) = member.display_name {
            if let Err(e) = self
                .message_pusher
                .broadcast(room.member_ids(), Notification::UserLeftChat { display_name })
                .await
            {
                tracing::warn!("Failed to broadcast user-left-chat: {}", e);
            }
        }

        let remaining = room.member_count();
        tracing::info!(
            "Connection {} left room '{}'. Members remaining: {}",
            connection_id,
            room_id,
            remaining
        );

        if registry.evict_if_empty(&mut room) {
            self.persistence.release(room_id).await;
            tracing::info!("Room '{}' removed from memory", room_id);
        } else if let Err(e) = self
            .message_pusher
            .broadcast(room.member_ids(), Notification::UsersInRoom(remaining))
            .await
        {
            tracing::warn!("Failed to broadcast users-in-room: {}", e);
        }
        true
    }
}
