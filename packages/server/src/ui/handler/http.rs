//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{HealthDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get list of active rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room = state
        .get_room_detail_usecase
        .execute(&RoomId::from(room_id))
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(RoomDetailDto::from(&room)))
}
