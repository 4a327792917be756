//! UseCase: 切断処理
//!
//! トランスポートの切断は、接続が参加している全ての Room からの退出として扱う。
//! 何度呼ばれても結果は同じ（冪等）。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, RoomRegistry};

use super::leave_room::LeaveRoomUseCase;

/// 切断のユースケース
pub struct DisconnectUseCase {
    registry: Arc<RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    leave_room: Arc<LeaveRoomUseCase>,
}

impl DisconnectUseCase {
    pub fn new(
        registry: Arc<RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        leave_room: Arc<LeaveRoomUseCase>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            leave_room,
        }
    }

    /// Leave every room the connection belongs to and stop delivering to it.
    ///
    /// # Returns
    ///
    /// The rooms the connection was removed from.
    pub async fn execute(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let mut left = Vec::new();
        {
            let mut registry = self.registry.lock().await;
            for room_id in registry.room_ids() {
                if self
                    .leave_room
                    .leave_locked(&mut registry, &room_id, connection_id)
                    .await
                {
                    left.push(room_id);
                }
            }
        }

        self.message_pusher.unregister_client(connection_id).await;
        tracing::info!(
            "Connection {} disconnected (left {} room(s))",
            connection_id,
            left.len()
        );
        left
    }
}
