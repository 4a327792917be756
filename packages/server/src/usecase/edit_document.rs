//! UseCase: ドキュメント編集
//!
//! フィールド単位で上書きし（後勝ち）、送信者以外のメンバーに配信してから
//! バックグラウンドで保存する。保存の成否は配信に影響しない。

use std::sync::Arc;

use tsudoi_shared::time::Clock;

use crate::domain::{
    ConnectionId, DocumentField, MessagePusher, Notification, RoomId, RoomRegistry, Timestamp,
};

use super::persistence::PersistenceBridge;

/// ドキュメント編集のユースケース
pub struct EditDocumentUseCase {
    registry: Arc<RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    persistence: Arc<PersistenceBridge>,
    clock: Arc<dyn Clock>,
}

impl EditDocumentUseCase {
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

    /// Overwrite one field of the room document.
    ///
    /// Returns `false` when the room does not exist.
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        field: DocumentField,
        content: String,
    ) -> bool {
        let Some(mut room) = self.registry.open(room_id).await else {
            tracing::debug!("Edit for unknown room '{}' ignored", room_id);
            return false;
        };

        room.apply_edit(field, content.clone());

        if let Err(e) = self
            .message_pusher
            .broadcast(
                room.member_ids_except(connection_id),
                Notification::CodeUpdate { field, content },
            )
            .await
        {
            tracing::warn!("Failed to broadcast code-update: {}", e);
        }

        let last_modified = Timestamp::new(self.clock.now_millis());
        self.persistence
            .schedule_save(room_id, room.document().clone(), last_modified)
            .await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionIdentity, Document, StoreError, repository::MockDocumentStore},
        infrastructure::store::InMemoryDocumentStore,
        usecase::test_support::{Harness, NOW, drain, room},
    };

    #[tokio::test]
    async fn test_edit_reaches_others_but_not_sender() {
        // テスト項目: 編集は送信者以外に配信され、送信者には届かない
        // given (前提条件):
        let hub = Harness::new();
        let (c1, mut rx1) = hub.connect("c1").await;
        let (c2, mut rx2) = hub.connect("c2").await;
        hub.join.execute(&room("R1"), &c1, &ConnectionIdentity::Anonymous).await;
        hub.join.execute(&room("R1"), &c2, &ConnectionIdentity::Anonymous).await;
        drain(&mut rx1);
        drain(&mut rx2);

        // when (操作):
        let applied = hub
            .edit
            .execute(&room("R1"), &c1, DocumentField::Html, "<h1>x</h1>".to_string())
            .await;

        // then (期待する結果):
        assert!(applied);
        assert_eq!(
            drain(&mut rx2),
            vec![Notification::CodeUpdate {
                field: DocumentField::Html,
                content: "<h1>x</h1>".to_string()
            }]
        );
        assert!(drain(&mut rx1).is_empty());
    }

    #[tokio::test]
    async fn test_edit_is_persisted_with_timestamp() {
        // テスト項目: 編集後のドキュメント全体が最終更新時刻とともに保存される
        // given (前提条件):
        let store = Arc::new(InMemoryDocumentStore::new());
        let hub = Harness::with_store(store.clone());
        let (c1, _rx1) = hub.connect("c1").await;
        hub.join.execute(&room("R1"), &c1, &ConnectionIdentity::Anonymous).await;

        // when (操作):
        hub.edit
            .execute(&room("R1"), &c1, DocumentField::Css, "p{}".to_string())
            .await;
        hub.edit
            .execute(&room("R1"), &c1, DocumentField::Js, "go()".to_string())
            .await;
        hub.persistence.shutdown().await;

        // then (期待する結果):
        let stored = store.get(&room("R1")).await.unwrap();
        assert_eq!(
            stored.document,
            Document {
                html: String::new(),
                css: "p{}".to_string(),
                js: "go()".to_string(),
            }
        );
        assert_eq!(stored.last_modified, Timestamp::new(NOW));
    }

    #[tokio::test]
    async fn test_edit_survives_store_failure() {
        // テスト項目: 保存に失敗しても配信とメモリ上の状態は維持される
        // given (前提条件):
        let mut store = MockDocumentStore::new();
        store.expect_load().returning(|_| Ok(None));
        store
            .expect_upsert()
            .returning(|_, _, _| Err(StoreError::Unavailable("write rejected".to_string())));
        let hub = Harness::with_store(Arc::new(store));
        let (c1, _rx1) = hub.connect("c1").await;
        let (c2, mut rx2) = hub.connect("c2").await;
        hub.join.execute(&room("R1"), &c1, &ConnectionIdentity::Anonymous).await;
        hub.join.execute(&room("R1"), &c2, &ConnectionIdentity::Anonymous).await;
        drain(&mut rx2);

        // when (操作):
        hub.edit
            .execute(&room("R1"), &c1, DocumentField::Js, "a()".to_string())
            .await;
        hub.persistence.shutdown().await;

        // then (期待する結果):
        assert_eq!(drain(&mut rx2).len(), 1);
        let snapshot = hub.registry.snapshot_room(&room("R1")).await.unwrap();
        assert_eq!(snapshot.document().js, "a()");
    }

    #[tokio::test]
    async fn test_edit_to_unknown_room_is_ignored() {
        // テスト項目: 存在しない Room への編集は何もしない
        // given (前提条件):
        let store = Arc::new(InMemoryDocumentStore::new());
        let hub = Harness::with_store(store.clone());
        let (c1, _rx1) = hub.connect("c1").await;

        // when (操作):
        let applied = hub
            .edit
            .execute(&room("nope"), &c1, DocumentField::Html, "x".to_string())
            .await;
        hub.persistence.shutdown().await;

        // then (期待する結果):
        assert!(!applied);
        assert!(!hub.registry.contains(&room("nope")).await);
        assert!(store.get(&room("nope")).await.is_none());
    }
}
