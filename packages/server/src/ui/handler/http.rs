//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{MessageId, RoomId, UserId},
    infrastructure::dto::http::{MessageDto, RoomDetailDto, RoomSummaryDto},
    ui::{protocol_error::ProtocolError, state::AppState},
};

/// HTTP status for an error that would be reported to a WebSocket client.
fn status_of(error: impl Into<ProtocolError>) -> StatusCode {
    let error = error.into();
    StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, StatusCode> {
    let rooms = state.rooms.list().await.map_err(status_of)?;
    Ok(Json(rooms.iter().map(RoomSummaryDto::from).collect()))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(status_of)?;
    let room = state.rooms.find_by_id(room_id).await.map_err(status_of)?;
    let connections = state.engine.group_size(&room.group_name()).await;
    Ok(Json(RoomDetailDto::new(&room, connections)))
}

/// Get a single message, typically after a `{"text": "<id>"}` notification
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<i64>,
) -> Result<Json<MessageDto>, StatusCode> {
    let message_id = MessageId::new(message_id).map_err(status_of)?;
    let message = state
        .messages
        .find_by_id(message_id)
        .await
        .map_err(status_of)?;
    Ok(Json(MessageDto::from(&message)))
}

/// Get the conversation between two identities, newest first
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path((a, b)): Path<(i64, i64)>,
) -> Result<Json<Vec<MessageDto>>, StatusCode> {
    let a = UserId::new(a).map_err(status_of)?;
    let b = UserId::new(b).map_err(status_of)?;
    let messages = state
        .messages
        .list_conversation(a, b)
        .await
        .map_err(status_of)?;
    Ok(Json(messages.iter().map(MessageDto::from).collect()))
}
