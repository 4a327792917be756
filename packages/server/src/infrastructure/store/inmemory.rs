//! InMemory Document Store 実装
//!
//! HashMap をインメモリ DB として使用する。プロセスが終了すると内容は失われる。

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::{Document, DocumentStore, RoomId, StoreError, Timestamp};

/// A persisted room document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub room_id: RoomId,
    pub document: Document,
    pub last_modified: Timestamp,
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<HashMap<RoomId, StoredDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full stored record of a room.
    pub async fn get(&self, room_id: &RoomId) -> Option<StoredDocument> {
        self.documents.lock().await.get(room_id).cloned()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn load(&self, room_id: &RoomId) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.lock().await;
        Ok(documents.get(room_id).map(|stored| stored.document.clone()))
    }

    async fn upsert(
        &self,
        room_id: &RoomId,
        document: Document,
        last_modified: Timestamp,
    ) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().await;
        documents.insert(
            room_id.clone(),
            StoredDocument {
                room_id: room_id.clone(),
                document,
                last_modified,
            },
        );
        Ok(())
    }
}
