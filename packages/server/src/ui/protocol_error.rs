//! Client-visible errors and their rendering at the connection boundary.
//!
//! [`ProtocolError`] is the only error kind that reaches a client. Use case
//! errors are converted into it here; internal failures collapse into the
//! default value so their details never leave the server.

use thiserror::Error;

use crate::{
    domain::{AuthorizationError, PersistenceError, ValidationError},
    infrastructure::dto::websocket::{ErrorFrame, ErrorFrameType},
    usecase::{ConnectError, CreateMessageError, RoomAccessError, UpdateMessageError},
};

pub const DEFAULT_STATUS_CODE: u16 = 500;
pub const DEFAULT_REASON_PHRASE: &str = "Unexpected error happened.";

pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_FORBIDDEN: u16 = 403;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
/// Close status for a connection dropped from fan-out for reading too slowly
pub const STATUS_TOO_SLOW: u16 = 4008;

/// Business-rule violation reported back to the originating connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason_phrase} (status {status_code})")]
pub struct ProtocolError {
    status_code: u16,
    reason_phrase: String,
}

impl Default for ProtocolError {
    fn default() -> Self {
        Self {
            status_code: DEFAULT_STATUS_CODE,
            reason_phrase: DEFAULT_REASON_PHRASE.to_string(),
        }
    }
}

impl ProtocolError {
    pub fn new(status_code: u16, reason_phrase: impl Into<String>) -> Self {
        Self {
            status_code,
            reason_phrase: reason_phrase.into(),
        }
    }

    /// Default status, custom reason.
    pub fn with_reason(reason_phrase: impl Into<String>) -> Self {
        Self::from_parts(Some(reason_phrase.into()), None)
    }

    /// Custom status, default reason.
    pub fn with_status(status_code: u16) -> Self {
        Self::from_parts(None, Some(status_code))
    }

    /// Override whichever parts are given and keep the defaults for the rest.
    pub fn from_parts(reason_phrase: Option<String>, status_code: Option<u16>) -> Self {
        let mut error = Self::default();
        if let Some(status_code) = status_code {
            error.status_code = status_code;
        }
        if let Some(reason_phrase) = reason_phrase {
            error.reason_phrase = reason_phrase;
        }
        error
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }
}

/// Render the error frame sent to the client.
pub fn render_error_frame(error: &ProtocolError) -> ErrorFrame {
    ErrorFrame {
        r#type: ErrorFrameType::Error,
        status: error.status_code,
        reason: error.reason_phrase.clone(),
    }
}

/// WebSocket close code carrying the error's status.
///
/// Codes valid on the wire pass through; anything else is folded into the
/// application range 4000-4999.
pub fn close_code(error: &ProtocolError) -> u16 {
    match error.status_code {
        code @ (1000..=1003 | 1007..=1014 | 3000..=4999) => code,
        other => 4000 + other % 1000,
    }
}

fn internal(context: &str, error: &dyn std::error::Error) -> ProtocolError {
    tracing::error!(error = %error, "{context}");
    ProtocolError::default()
}

impl From<ValidationError> for ProtocolError {
    fn from(error: ValidationError) -> Self {
        Self::new(STATUS_BAD_REQUEST, error.to_string())
    }
}

impl From<AuthorizationError> for ProtocolError {
    fn from(error: AuthorizationError) -> Self {
        let status = match error {
            AuthorizationError::UnknownIdentity(_) => STATUS_NOT_FOUND,
            AuthorizationError::StaffOnly(_) | AuthorizationError::NotAuthor(_) => {
                STATUS_FORBIDDEN
            }
        };
        Self::new(status, error.to_string())
    }
}

impl From<PersistenceError> for ProtocolError {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::RoomNotFound(_) => Self::new(STATUS_NOT_FOUND, "Room does not exist."),
            PersistenceError::MessageNotFound(_) => {
                Self::new(STATUS_NOT_FOUND, "Message does not exist.")
            }
            PersistenceError::Unavailable(_) => internal("Store failure", &error),
        }
    }
}

impl From<CreateMessageError> for ProtocolError {
    fn from(error: CreateMessageError) -> Self {
        match error {
            CreateMessageError::Validation(e) => e.into(),
            CreateMessageError::Authorization(e) => e.into(),
            CreateMessageError::Persistence(e) => internal("Failed to create message", &e),
        }
    }
}

impl From<UpdateMessageError> for ProtocolError {
    fn from(error: UpdateMessageError) -> Self {
        match error {
            UpdateMessageError::Authorization(e) => e.into(),
            UpdateMessageError::Persistence(e) => e.into(),
        }
    }
}

impl From<RoomAccessError> for ProtocolError {
    fn from(error: RoomAccessError) -> Self {
        match error {
            RoomAccessError::Validation(e) => e.into(),
            RoomAccessError::Authorization(e) => e.into(),
            RoomAccessError::Persistence(e) => e.into(),
            RoomAccessError::NotJoined(_) => Self::new(STATUS_CONFLICT, error.to_string()),
        }
    }
}

impl From<ConnectError> for ProtocolError {
    fn from(error: ConnectError) -> Self {
        match error {
            ConnectError::Authorization(e) => e.into(),
            ConnectError::Persistence(e) => internal("Failed to resolve identity", &e),
        }
    }
}
