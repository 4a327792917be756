//! UseCase: ルーム参加処理
//!
//! ## 何をするか
//! - Room が存在しなければ作成する（初回は永続化されたドキュメントを非同期に読み込む）
//! - 認証済みユーザーは表示名を予約して参加し、他のメンバーに通知する
//! - ゲストは名前なしで参加する
//! - 参加者本人に現在のドキュメントを送り、Room 全体に人数を通知する

use std::sync::Arc;

use tsudoi_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConnectionIdentity, Member, MessagePusher, Notification, RoomId, RoomRegistry,
    Timestamp,
};

use super::persistence::PersistenceBridge;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    persistence: Arc<PersistenceBridge>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        registry: Arc<RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        persistence: Arc<PersistenceBridge>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            persistence,
            clock,
        }
    }

    /// Add a connection to a room.
    ///
    /// # Returns
    ///
    /// The member count after joining.
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        identity: &ConnectionIdentity,
    ) -> usize {
        let now = Timestamp::new(self.clock.now_millis());
        let (mut room, created) = {
            let mut registry = self.registry.lock().await;
            let opened = registry.open_or_create(room_id, now).await;
            opened
        };

        room.add_member(Member::from_identity(connection_id.clone(), identity));

        match identity {
            ConnectionIdentity::Verified(verified) => {
                tracing::info!(
                    "Authenticated user {} ({}) joined room '{}'",
                    verified.display_name,
                    connection_id,
                    room_id
                );
                self.broadcast(
                    room.member_ids_except(connection_id),
                    Notification::UserJoinedChat {
                        display_name: verified.display_name.clone(),
                    },
                )
                .await;
            }
            ConnectionIdentity::Anonymous => {
                tracing::info!("Guest {} joined room '{}'", connection_id, room_id);
            }
        }

        if created {
            self.spawn_initial_load(room_id.clone(), room.generation());
        }

        self.push(connection_id, Notification::LoadCode(room.document().clone()))
            .await;
        if let Some(verified) = identity.verified() {
            self.push(
                connection_id,
                Notification::AuthenticatedUser {
                    display_name: verified.display_name.clone(),
                    user_id: verified.user_id.clone(),
                },
            )
            .await;
        }

        let count = room.member_count();
        self.broadcast(room.member_ids(), Notification::UsersInRoom(count))
            .await;
        count
    }

    /// Load the persisted document of a freshly created room in the background.
    ///
    /// The result is applied only to the same room incarnation and only to
    /// fields nobody has edited yet. Members are sent the merged document.
    fn spawn_initial_load(&self, room_id: RoomId, generation: u64) {
        let registry = self.registry.clone();
        let message_pusher = self.message_pusher.clone();
        let persistence = self.persistence.clone();

        tokio::spawn(async move {
            let document = match persistence.load(&room_id).await {
                Ok(Some(document)) => document,
                Ok(None) => {
                    tracing::debug!("No saved document for room '{}'", room_id);
                    return;
                }
                Err(e) => {
                    tracing::error!("Error loading room '{}': {}", room_id, e);
                    return;
                }
            };

            let Some(mut room) = registry.open(&room_id).await else {
                tracing::debug!("Room '{}' closed before its document loaded", room_id);
                return;
            };
            if room.generation() != generation {
                tracing::debug!("Discarding stale load for room '{}'", room_id);
                return;
            }

            if room.apply_loaded_document(document) {
                tracing::info!("Loaded saved document for room '{}'", room_id);
                let snapshot = room.document().clone();
                if let Err(e) = message_pusher
                    .broadcast(room.member_ids(), Notification::LoadCode(snapshot))
                    .await
                {
                    tracing::warn!("Failed to broadcast loaded document: {}", e);
                }
            }
        });
    }

    async fn push(&self, connection_id: &ConnectionId, notification: Notification) {
        if let Err(e) = self.message_pusher.push_to(connection_id, notification).await {
            tracing::warn!("Failed to push to '{}': {}", connection_id, e);
        }
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, notification: Notification) {
        if let Err(e) = self.message_pusher.broadcast(targets, notification).await {
            tracing::warn!("Failed to broadcast: {}", e);
        }
    }
}
