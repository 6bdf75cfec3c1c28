//! Core domain models for the chat application.

use serde::{Deserialize, Serialize};

use super::{
    error::ValidationError,
    value_object::{GroupKey, MessageBody, MessageId, RoomId, Timestamp, UserId},
};

/// Kind of a chat message. Wire values are stable and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
#[repr(u8)]
pub enum MessageType {
    /// Normal message
    #[default]
    Message = 0,
    /// Cautionary message
    Warning = 1,
    /// Urgent or dangerous message
    Alert = 2,
    /// Informational, non-intrusive message
    Muted = 3,
    /// Presence: joined
    Enter = 4,
    /// Presence: left
    Leave = 5,
}

const MESSAGE_TYPE_CHOICES: [(&str, u8); 6] = [
    ("MESSAGE", MessageType::Message as u8),
    ("WARNING", MessageType::Warning as u8),
    ("ALERT", MessageType::Alert as u8),
    ("MUTED", MessageType::Muted as u8),
    ("ENTER", MessageType::Enter as u8),
    ("LEAVE", MessageType::Leave as u8),
];

impl MessageType {
    /// `(name, wire value)` for every member, in wire order.
    pub fn choices() -> &'static [(&'static str, u8)] {
        &MESSAGE_TYPE_CHOICES
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        MESSAGE_TYPE_CHOICES[self as usize].0
    }
}

impl TryFrom<i64> for MessageType {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Message),
            1 => Ok(Self::Warning),
            2 => Ok(Self::Alert),
            3 => Ok(Self::Muted),
            4 => Ok(Self::Enter),
            5 => Ok(Self::Leave),
            other => Err(ValidationError::UnknownMessageType(other)),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(kind: MessageType) -> Self {
        kind as u8
    }
}

/// A persisted chat message between two identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: UserId,
    pub recipient: UserId,
    /// Assigned once at creation
    pub timestamp: Timestamp,
    pub body: MessageBody,
    #[serde(rename = "type")]
    pub message_type: MessageType,
}

impl Message {
    /// Number of characters in the body.
    pub fn characters(&self) -> usize {
        self.body.characters()
    }

    /// Return a copy carrying a new body; everything else is preserved.
    pub fn with_body(&self, body: MessageBody) -> Self {
        Self {
            body,
            ..self.clone()
        }
    }
}

/// A message that has not been stored yet and therefore has no id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub author: UserId,
    pub recipient: UserId,
    pub timestamp: Timestamp,
    pub body: MessageBody,
    pub message_type: MessageType,
}

impl NewMessage {
    pub fn into_message(self, id: MessageId) -> Message {
        Message {
            id,
            author: self.author,
            recipient: self.recipient,
            timestamp: self.timestamp,
            body: self.body,
            message_type: self.message_type,
        }
    }
}

/// A named group channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub title: String,
    /// Only staff identities may join or post
    pub staff_only: bool,
    pub created_at: Timestamp,
}

impl Room {
    /// Broadcast key of the room's audience, `room-{id}`.
    pub fn group_name(&self) -> GroupKey {
        GroupKey::for_room(self.id)
    }

    pub fn is_staff_only(&self) -> bool {
        self.staff_only
    }
}

/// Room attributes before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub title: String,
    pub staff_only: bool,
    pub created_at: Timestamp,
}

/// Read-only view of an identity resolved by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub is_staff: bool,
}

impl Identity {
    /// Whether this identity may use the given room.
    pub fn can_access(&self, room: &Room) -> bool {
        !room.is_staff_only() || self.is_staff
    }
}
