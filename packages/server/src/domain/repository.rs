//! Repository traits (ports) for persisted entities.
//!
//! The domain layer owns these traits; infrastructure provides the
//! implementations and use cases only ever see `Arc<dyn ...Repository>`.

use async_trait::async_trait;

use super::{
    entity::{Message, NewMessage, NewRoom, Room},
    error::PersistenceError,
    value_object::{MessageId, RoomId, UserId},
};

/// Durable store of chat messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a new message and return it with its assigned id.
    async fn insert(&self, message: NewMessage) -> Result<Message, PersistenceError>;

    /// Overwrite an existing message. Fails if the id is unknown.
    async fn update(&self, message: Message) -> Result<Message, PersistenceError>;

    async fn find_by_id(&self, id: MessageId) -> Result<Message, PersistenceError>;

    /// Messages exchanged between two identities, newest first.
    async fn list_conversation(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Vec<Message>, PersistenceError>;
}

/// Durable store of rooms.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn insert(&self, room: NewRoom) -> Result<Room, PersistenceError>;

    async fn find_by_id(&self, id: RoomId) -> Result<Room, PersistenceError>;

    /// All rooms ordered by id.
    async fn list(&self) -> Result<Vec<Room>, PersistenceError>;
}
