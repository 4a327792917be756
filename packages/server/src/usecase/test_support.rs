//! Shared fixtures for use case tests.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tsudoi_shared::time::{Clock, FixedClock};

use crate::{
    domain::{
        ConnectionId, ConnectionIdentity, Document, DocumentStore, MessagePusher, Notification,
        RoomId, RoomRegistry, StoreError, Timestamp, VerifiedIdentity,
    },
    infrastructure::{message_pusher::WebSocketMessagePusher, store::InMemoryDocumentStore},
};

use super::{
    DisconnectUseCase, EditDocumentUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    PersistenceBridge, SendChatMessageUseCase, SetUsernameUseCase,
};

pub const NOW: i64 = 1_700_000_000_000;

/// Fully wired hub with an in-memory store and channel-backed connections.
pub struct Harness {
    pub registry: Arc<RoomRegistry>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub persistence: Arc<PersistenceBridge>,
    pub join: JoinRoomUseCase,
    pub leave: Arc<LeaveRoomUseCase>,
    pub disconnect: DisconnectUseCase,
    pub set_username: SetUsernameUseCase,
    pub edit: EditDocumentUseCase,
    pub chat: SendChatMessageUseCase,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryDocumentStore::new()))
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(HashMap::new()))));
        let persistence = Arc::new(PersistenceBridge::new(store));
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(NOW));

        let leave = Arc::new(LeaveRoomUseCase::new(
            registry.clone(),
            pusher.clone(),
            persistence.clone(),
        ));
        Self {
            join: JoinRoomUseCase::new(
                registry.clone(),
                pusher.clone(),
                persistence.clone(),
                clock.clone(),
            ),
            disconnect: DisconnectUseCase::new(registry.clone(), pusher.clone(), leave.clone()),
            set_username: SetUsernameUseCase::new(registry.clone(), pusher.clone()),
            edit: EditDocumentUseCase::new(
                registry.clone(),
                pusher.clone(),
                persistence.clone(),
                clock.clone(),
            ),
            chat: SendChatMessageUseCase::new(registry.clone(), pusher.clone(), clock),
            leave,
            registry,
            pusher,
            persistence,
        }
    }

    /// Register a connection with the pusher and hand back its inbox.
    pub async fn connect(&self, id: &str) -> (ConnectionId, mpsc::UnboundedReceiver<Notification>) {
        let connection_id = ConnectionId::new(id);
        let (tx, rx) = mpsc::unbounded_channel();
        self.pusher.register_client(connection_id.clone(), tx).await;
        (connection_id, rx)
    }
}

pub fn room(id: &str) -> RoomId {
    RoomId::new(id)
}

pub fn verified(user_id: &str, name: &str) -> ConnectionIdentity {
    ConnectionIdentity::Verified(VerifiedIdentity {
        user_id: user_id.to_string(),
        display_name: name.to_string(),
    })
}

/// Everything currently queued for a connection.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut received = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        received.push(notification);
    }
    received
}

/// Wait for the next notification matching `predicate`, skipping others.
pub async fn wait_for<F>(rx: &mut mpsc::UnboundedReceiver<Notification>, predicate: F) -> Notification
where
    F: Fn(&Notification) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Some(notification) if predicate(&notification) => return notification,
                Some(_) => continue,
                None => panic!("connection channel closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for notification")
}

/// In-memory store whose writes take `delay` to land.
pub struct SlowDocumentStore {
    inner: InMemoryDocumentStore,
    delay: Duration,
}

impl SlowDocumentStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl DocumentStore for SlowDocumentStore {
    async fn load(&self, room_id: &RoomId) -> Result<Option<Document>, StoreError> {
        self.inner.load(room_id).await
    }

    async fn upsert(
        &self,
        room_id: &RoomId,
        document: Document,
        last_modified: Timestamp,
    ) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.upsert(room_id, document, last_modified).await
    }
}
