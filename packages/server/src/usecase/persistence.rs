//! Persistence Bridge: best-effort background I/O against the document store.
//!
//! Saves never block the caller. Each room gets its own writer task fed by an
//! unbounded queue, so saves for a room reach the store in the order they were
//! scheduled. When a room is evicted its queue is closed and the writer drains
//! whatever is still queued before exiting. Both the load and the writer of a
//! recreated room wait for the previous incarnation's writer to finish first.
//!
//! Failures are logged and dropped. There is no retry.

use std::{collections::HashMap, sync::Arc};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, mpsc};

use crate::domain::{Document, DocumentStore, RoomId, StoreError, Timestamp};

struct PendingSave {
    document: Document,
    last_modified: Timestamp,
}

/// Resolves once a writer has attempted every save queued to it.
type WriterDone = Shared<BoxFuture<'static, ()>>;

struct Writer {
    queue: mpsc::UnboundedSender<PendingSave>,
    done: WriterDone,
}

#[derive(Default)]
struct Writers {
    active: HashMap<RoomId, Writer>,
    draining: HashMap<RoomId, WriterDone>,
}

pub struct PersistenceBridge {
    store: Arc<dyn DocumentStore>,
    writers: Mutex<Writers>,
}

impl PersistenceBridge {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            writers: Mutex::new(Writers::default()),
        }
    }

    /// Fetch the persisted document of a room.
    ///
    /// Saves still queued from an evicted incarnation of the room land first.
    pub async fn load(&self, room_id: &RoomId) -> Result<Option<Document>, StoreError> {
        let pending = self.writers.lock().await.draining.get(room_id).cloned();
        if let Some(pending) = pending {
            tracing::debug!("Waiting for pending saves of room '{}' before loading", room_id);
            pending.await;
        }
        self.store.load(room_id).await
    }

    /// Queue a save of the full document. Returns immediately.
    pub async fn schedule_save(&self, room_id: &RoomId, document: Document, last_modified: Timestamp) {
        let mut writers = self.writers.lock().await;
        if !writers.active.contains_key(room_id) {
            let previous = writers.draining.remove(room_id);
            let writer = spawn_writer(self.store.clone(), room_id.clone(), previous);
            writers.active.insert(room_id.clone(), writer);
        }

        let Some(writer) = writers.active.get(room_id) else {
            return;
        };
        if writer
            .queue
            .send(PendingSave {
                document,
                last_modified,
            })
            .is_err()
        {
            tracing::error!("Writer for room '{}' is gone, save dropped", room_id);
        }
    }

    /// Close the room's queue. Already queued saves still complete.
    pub async fn release(&self, room_id: &RoomId) {
        let mut writers = self.writers.lock().await;
        writers
            .draining
            .retain(|_, done| done.clone().now_or_never().is_none());
        if let Some(writer) = writers.active.remove(room_id) {
            drop(writer.queue);
            writers.draining.insert(room_id.clone(), writer.done);
        }
    }

    /// Close every queue and wait until all queued saves have been attempted.
    pub async fn shutdown(&self) {
        let pending: Vec<WriterDone> = {
            let mut writers = self.writers.lock().await;
            let active = std::mem::take(&mut writers.active);
            let draining = std::mem::take(&mut writers.draining);
            active
                .into_values()
                .map(|writer| writer.done)
                .chain(draining.into_values())
                .collect()
        };

        let count = pending.len();
        for done in pending {
            done.await;
        }
        tracing::info!("Persistence flushed ({} writer(s))", count);
    }

    /// Number of rooms with an open save queue.
    pub async fn active_writers(&self) -> usize {
        self.writers.lock().await.active.len()
    }
}

fn spawn_writer(
    store: Arc<dyn DocumentStore>,
    room_id: RoomId,
    previous: Option<WriterDone>,
) -> Writer {
    let (queue, mut rx) = mpsc::unbounded_channel::<PendingSave>();
    let task_room_id = room_id.clone();
    let handle = tokio::spawn(async move {
        let room_id = task_room_id;
        if let Some(previous) = previous {
            previous.await;
        }

        while let Some(save) = rx.recv().await {
            match store
                .upsert(&room_id, save.document, save.last_modified)
                .await
            {
                Ok(()) => tracing::debug!("Saved document of room '{}'", room_id),
                Err(e) => tracing::error!("Error saving room '{}': {}", room_id, e),
            }
        }
        tracing::debug!("Writer for room '{}' stopped", room_id);
    });

    let done = async move {
        if let Err(e) = handle.await {
            tracing::error!("Writer task for room '{}' failed: {}", room_id, e);
        }
    }
    .boxed()
    .shared();
    Writer { queue, done }
}
