//! JSON file document store.
//!
//! Each room is stored as `<dir>/<sha256 of the room id, hex>.json`. The
//! digest keeps arbitrary room names (slashes, dots, unicode, any length) out
//! of the path. The id itself is kept inside the record.
//! Writes go to a temporary file that is then renamed over the old one.

use std::{
    fmt::Write as _,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::{Document, DocumentStore, RoomId, StoreError, Timestamp};

use super::inmemory::StoredDocument;

pub struct JsonFileDocumentStore {
    dir: PathBuf,
}

impl JsonFileDocumentStore {
    /// Open the store, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::info!("Document store directory: {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, room_id: &RoomId) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(room_id)))
    }

    /// Full stored record of a room.
    pub async fn get(&self, room_id: &RoomId) -> Result<Option<StoredDocument>, StoreError> {
        match tokio::fs::read(self.path_for(room_id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn file_stem(room_id: &RoomId) -> String {
    let digest = Sha256::digest(room_id.as_str().as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[async_trait]
impl DocumentStore for JsonFileDocumentStore {
    async fn load(&self, room_id: &RoomId) -> Result<Option<Document>, StoreError> {
        Ok(self.get(room_id).await?.map(|stored| stored.document))
    }

    async fn upsert(
        &self,
        room_id: &RoomId,
        document: Document,
        last_modified: Timestamp,
    ) -> Result<(), StoreError> {
        let record = StoredDocument {
            room_id: room_id.clone(),
            document,
            last_modified,
        };
        let bytes = serde_json::to_vec_pretty(&record)?;

        let path = self.path_for(room_id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
