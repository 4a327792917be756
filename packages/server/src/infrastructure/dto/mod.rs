//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: inbound and outbound WebSocket events
//! - `http`: HTTP API response bodies

pub mod conversion;
pub mod http;
pub mod websocket;
