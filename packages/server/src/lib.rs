//! Real-time collaborative session hub.
//!
//! Connections join named rooms, edit a shared three-field document and chat.
//! Documents are persisted in the background and reloaded when a room is
//! recreated.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
