//! WebSocket frame DTOs for the chat application.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{Message, MessageType, Payload, RoomId, UserId};

/// Serialize an outbound frame into a broadcast payload.
pub fn encode_frame<T: Serialize>(frame: &T) -> Result<Payload, serde_json::Error> {
    serde_json::to_string(frame).map(Arc::from)
}

/// Command sent by a client over the WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum ClientCommand {
    /// Direct message to another identity
    Send {
        recipient: i64,
        body: String,
        #[serde(default, rename = "type")]
        message_type: Option<i64>,
    },
    Join {
        room: i64,
    },
    Leave {
        room: i64,
    },
    /// Replace the body of a message the sender authored
    Edit {
        message: i64,
        body: String,
    },
    /// Message to every member of a joined room
    Post {
        room: i64,
        body: String,
        #[serde(default, rename = "type")]
        message_type: Option<i64>,
    },
}

/// New-message notification pushed to the author's and recipient's connections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFrame {
    /// Message id, as text
    pub text: String,
}

impl NotificationFrame {
    pub fn for_message(message: &Message) -> Self {
        Self {
            text: message.id.to_string(),
        }
    }
}

/// Message or presence event delivered to a room's members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomFrame {
    pub room: RoomId,
    pub user: UserId,
    pub message: String,
    pub msg_type: MessageType,
}

/// Marker serialized as the literal `"error"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorFrameType {
    Error,
}

/// Error reported back to the originating connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrame {
    pub r#type: ErrorFrameType,
    pub status: u16,
    pub reason: String,
}
