//! Domain layer error definitions.

use thiserror::Error;

use super::value_object::{MessageId, RoomId, UserId};

/// Malformed input rejected before anything is persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Message type outside the closed enumeration
    #[error("Unknown message type: {0}")]
    UnknownMessageType(i64),

    /// Identifier that is not a positive integer
    #[error("{kind} must be a positive integer (got {value})")]
    InvalidIdentifier { kind: &'static str, value: i64 },
}

/// Access rule violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// Non-staff identity tried to use a staff-only room
    #[error("Room {0} is restricted to staff")]
    StaffOnly(RoomId),

    /// Identity unknown to the identity provider
    #[error("Unknown identity: {0}")]
    UnknownIdentity(UserId),

    /// Only the author may change a message
    #[error("Message {0} was written by someone else")]
    NotAuthor(MessageId),
}

/// Store failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// The backing store could not complete the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
