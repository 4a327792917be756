//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::DocumentDto;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Room list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub member_count: usize,
    /// Reserved display names, sorted
    pub display_names: Vec<String>,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub connection_id: String,
    pub display_name: Option<String>,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub created_at: String,
    pub members: Vec<MemberDto>,
    pub document: DocumentDto,
}
