//! HTTP API response DTOs for the chat application.

use serde::{Deserialize, Serialize};

use hiroba_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{Message, Room};

/// Room summary for list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: i64,
    pub title: String,
    pub staff_only: bool,
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.value(),
            title: room.title.clone(),
            staff_only: room.staff_only,
        }
    }
}

/// Room detail for detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: i64,
    pub title: String,
    pub staff_only: bool,
    /// Broadcast key members are subscribed to
    pub group_name: String,
    /// Live connections subscribed on this server
    pub connections: usize,
    pub created_at: String, // ISO 8601
}

impl RoomDetailDto {
    pub fn new(room: &Room, connections: usize) -> Self {
        Self {
            id: room.id.value(),
            title: room.title.clone(),
            staff_only: room.staff_only,
            group_name: room.group_name().to_string(),
            connections,
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        }
    }
}

/// Message detail, fetched by clients after a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: i64,
    pub author: i64,
    pub recipient: i64,
    pub body: String,
    pub characters: usize,
    pub r#type: u8,
    pub timestamp: String, // ISO 8601
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.value(),
            author: message.author.value(),
            recipient: message.recipient.value(),
            body: message.body.as_str().to_string(),
            characters: message.characters(),
            r#type: message.message_type.value(),
            timestamp: timestamp_to_jst_rfc3339(message.timestamp.value()),
        }
    }
}
