//! Document store implementations.
//!
//! - `inmemory`: process-local map, used when no storage directory is configured
//! - `file`: one JSON file per room

pub mod file;
pub mod inmemory;

pub use file::JsonFileDocumentStore;
pub use inmemory::{InMemoryDocumentStore, StoredDocument};
