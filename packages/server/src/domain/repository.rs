//! Durable document store interface.
//!
//! The store keeps the last saved document of each room. The hub reads it
//! once when a room comes alive and writes it after every edit.

use async_trait::async_trait;

use super::{
    entity::Document,
    error::StoreError,
    value_object::{RoomId, Timestamp},
};

/// Key-value store of room documents, keyed by room id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the persisted document of a room. `Ok(None)` when never saved.
    async fn load(&self, room_id: &RoomId) -> Result<Option<Document>, StoreError>;

    /// Insert or replace the document of a room.
    async fn upsert(
        &self,
        room_id: &RoomId,
        document: Document,
        last_modified: Timestamp,
    ) -> Result<(), StoreError>;
}
