//! UseCase: Room 一覧・詳細の取得（HTTP API 用の読み取り専用クエリ）

use std::sync::Arc;

use crate::domain::{RoomId, RoomRegistry, RoomSession};

/// Room 一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<RoomRegistry>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// Snapshots of all live rooms, sorted by id.
    pub async fn execute(&self) -> Vec<RoomSession> {
        self.registry.snapshot().await
    }
}

/// Room 詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<RoomRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Option<RoomSession> {
        self.registry.snapshot_room(room_id).await
    }
}
