//! Domain factories for creating domain entities from raw input.

use super::{
    entity::{MessageType, NewMessage, NewRoom},
    error::ValidationError,
    value_object::{MessageBody, Timestamp, UserId},
};

/// Factory for building unsaved messages.
///
/// Encapsulates body normalization and type validation so every creation path
/// produces a message that satisfies the same invariants.
pub struct MessageFactory;

impl MessageFactory {
    /// Build a `NewMessage` from client input.
    ///
    /// `message_type` defaults to [`MessageType::Message`] when absent.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an unknown type.
    pub fn draft(
        author: UserId,
        recipient: UserId,
        body: &str,
        message_type: Option<i64>,
        timestamp: Timestamp,
    ) -> Result<NewMessage, ValidationError> {
        let message_type = match message_type {
            Some(raw) => MessageType::try_from(raw)?,
            None => MessageType::default(),
        };
        Ok(NewMessage {
            author,
            recipient,
            timestamp,
            body: MessageBody::new(body),
            message_type,
        })
    }
}

/// Factory for building unsaved rooms.
pub struct RoomFactory;

impl RoomFactory {
    pub fn draft(title: &str, staff_only: bool, created_at: Timestamp) -> NewRoom {
        NewRoom {
            title: title.trim().to_string(),
            staff_only,
            created_at,
        }
    }
}
