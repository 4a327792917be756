//! Room Registry: the process-wide map of live rooms.
//!
//! Locking order is always registry first, then room. Structural changes
//! (creating or evicting a room) hold the registry lock for their whole
//! duration. Everything else takes the registry lock only long enough to find
//! the room, then serializes on the room's own lock, so different rooms make
//! progress in parallel.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use super::{
    entity::RoomSession,
    value_object::{RoomId, Timestamp},
};

type SharedRoom = Arc<Mutex<RoomSession>>;

/// Registry of active rooms. A room exists exactly while it has members.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, SharedRoom>>,
    next_generation: AtomicU64,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the registry lock for a structural change.
    pub async fn lock(&self) -> RegistryGuard<'_> {
        RegistryGuard {
            rooms: self.rooms.lock().await,
            next_generation: &self.next_generation,
        }
    }

    /// Lock a live room for a non-structural mutation.
    ///
    /// Returns `None` when the room does not exist or was evicted while this
    /// call waited for its lock.
    pub async fn open(&self, room_id: &RoomId) -> Option<OwnedMutexGuard<RoomSession>> {
        let room = self.rooms.lock().await.get(room_id).cloned()?;
        let guard = room.lock_owned().await;
        if guard.is_evicted() { None } else { Some(guard) }
    }

    pub async fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.lock().await.contains_key(room_id)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Point-in-time copies of every live room, sorted by id.
    pub async fn snapshot(&self) -> Vec<RoomSession> {
        let rooms: Vec<SharedRoom> = self.rooms.lock().await.values().cloned().collect();
        let mut sessions = Vec::with_capacity(rooms.len());
        for room in rooms {
            let room = room.lock().await;
            if !room.is_evicted() {
                sessions.push(room.clone());
            }
        }
        sessions.sort_by(|a, b| a.id().cmp(b.id()));
        sessions
    }

    /// Point-in-time copy of a single room.
    pub async fn snapshot_room(&self, room_id: &RoomId) -> Option<RoomSession> {
        self.open(room_id).await.map(|room| room.clone())
    }
}

/// Exclusive access to the room map.
pub struct RegistryGuard<'a> {
    rooms: MutexGuard<'a, HashMap<RoomId, SharedRoom>>,
    next_generation: &'a AtomicU64,
}

impl RegistryGuard<'_> {
    /// Lock the room, creating it first if the id is unseen.
    ///
    /// The flag is `true` when the room was created by this call.
    pub async fn open_or_create(
        &mut self,
        room_id: &RoomId,
        now: Timestamp,
    ) -> (OwnedMutexGuard<RoomSession>, bool) {
        if let Some(room) = self.rooms.get(room_id).cloned() {
            return (room.lock_owned().await, false);
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let room = Arc::new(Mutex::new(RoomSession::new(
            room_id.clone(),
            generation,
            now,
        )));
        self.rooms.insert(room_id.clone(), room.clone());
        tracing::debug!("Room '{}' created (generation {})", room_id, generation);
        (room.lock_owned().await, true)
    }

    /// Lock an existing room.
    pub async fn open(&self, room_id: &RoomId) -> Option<OwnedMutexGuard<RoomSession>> {
        let room = self.rooms.get(room_id).cloned()?;
        Some(room.lock_owned().await)
    }

    /// Drop the room from the registry if it has no members left.
    ///
    /// Returns `true` when the room was evicted.
    pub fn evict_if_empty(&mut self, room: &mut RoomSession) -> bool {
        if !room.is_empty() {
            return false;
        }
        room.mark_evicted();
        self.rooms.remove(room.id());
        tracing::debug!("Room '{}' evicted", room.id());
        true
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, DocumentField, Member};

    fn room_id(id: &str) -> RoomId {
        RoomId::new(id)
    }

    #[tokio::test]
    async fn test_open_or_create_creates_room_once() {
        // テスト項目: 未知の RoomId は作成され、2回目は既存の Room が返される
        // given (前提条件):
        let registry = RoomRegistry::new();

        // when (操作):
        let created_first = {
            let mut guard = registry.lock().await;
            let (mut room, created) = guard.open_or_create(&room_id("R1"), Timestamp::new(1)).await;
            room.add_member(Member::guest(ConnectionId::new("c1")));
            created
        };
        let created_second = {
            let mut guard = registry.lock().await;
            let (_room, created) = guard.open_or_create(&room_id("R1"), Timestamp::new(2)).await;
            created
        };

        // then (期待する結果):
        assert!(created_first);
        assert!(!created_second);
        assert_eq!(registry.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_open_unknown_room_returns_none() {
        // テスト項目: 存在しない Room を開くと None が返される
        // given (前提条件):
        let registry = RoomRegistry::new();

        // when (操作):
        let room = registry.open(&room_id("missing")).await;

        // then (期待する結果):
        assert!(room.is_none());
    }

    #[tokio::test]
    async fn test_evict_if_empty_removes_room() {
        // テスト項目: メンバーがいなくなった Room はレジストリから削除される
        // given (前提条件):
        let registry = RoomRegistry::new();
        let conn = ConnectionId::new("c1");
        {
            let mut guard = registry.lock().await;
            let (mut room, _) = guard.open_or_create(&room_id("R1"), Timestamp::new(1)).await;
            room.add_member(Member::guest(conn.clone()));
        }

        // when (操作):
        let evicted = {
            let mut guard = registry.lock().await;
            let mut room = guard.open(&room_id("R1")).await.unwrap();
            room.remove_member(&conn);
            guard.evict_if_empty(&mut room)
        };

        // then (期待する結果):
        assert!(evicted);
        assert!(!registry.contains(&room_id("R1")).await);
        assert!(registry.open(&room_id("R1")).await.is_none());
    }

    #[tokio::test]
    async fn test_evict_if_empty_keeps_populated_room() {
        // テスト項目: メンバーが残っている Room は削除されない
        // given (前提条件):
        let registry = RoomRegistry::new();
        let mut guard = registry.lock().await;
        let (mut room, _) = guard.open_or_create(&room_id("R1"), Timestamp::new(1)).await;
        room.add_member(Member::guest(ConnectionId::new("c1")));

        // when (操作):
        let evicted = guard.evict_if_empty(&mut room);

        // then (期待する結果):
        assert!(!evicted);
        assert_eq!(guard.room_ids(), vec![room_id("R1")]);
    }

    #[tokio::test]
    async fn test_recreated_room_starts_fresh_with_new_generation() {
        // テスト項目: 削除後に再作成された Room は空のドキュメントと新しい世代番号を持つ
        // given (前提条件):
        let registry = RoomRegistry::new();
        let conn = ConnectionId::new("c1");
        let first_generation = {
            let mut guard = registry.lock().await;
            let (mut room, _) = guard.open_or_create(&room_id("R1"), Timestamp::new(1)).await;
            room.add_member(Member::guest(conn.clone()));
            room.apply_edit(DocumentField::Html, "<p>stale</p>".to_string());
            room.remove_member(&conn);
            guard.evict_if_empty(&mut room);
            room.generation()
        };

        // when (操作):
        let mut guard = registry.lock().await;
        let (room, created) = guard.open_or_create(&room_id("R1"), Timestamp::new(2)).await;

        // then (期待する結果):
        assert!(created);
        assert_ne!(room.generation(), first_generation);
        assert_eq!(room.document().html, "");
    }

    #[tokio::test]
    async fn test_snapshot_is_sorted_by_room_id() {
        // テスト項目: スナップショットは RoomId 順に並ぶ
        // given (前提条件):
        let registry = RoomRegistry::new();
        for id in ["b", "c", "a"] {
            let mut guard = registry.lock().await;
            let (mut room, _) = guard.open_or_create(&room_id(id), Timestamp::new(1)).await;
            room.add_member(Member::guest(ConnectionId::new(format!("conn-{id}"))));
        }

        // when (操作):
        let snapshot = registry.snapshot().await;

        // then (期待する結果):
        let ids: Vec<&str> = snapshot.iter().map(|room| room.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
