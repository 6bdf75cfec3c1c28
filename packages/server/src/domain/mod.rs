//! Domain layer for the chat application.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod broadcaster;
pub mod dispatcher;
pub mod entity;
pub mod error;
pub mod factory;
pub mod identity;
pub mod repository;
pub mod value_object;

pub use broadcaster::{ConnectionHandle, ConnectionId, DeliveryFailure, GroupBroadcaster, Payload};
pub use dispatcher::{DispatchError, Job, JobDispatcher, JobError, JobHandler};
pub use entity::{Identity, Message, MessageType, NewMessage, NewRoom, Room};
pub use error::{AuthorizationError, PersistenceError, ValidationError};
pub use factory::{MessageFactory, RoomFactory};
pub use identity::IdentityProvider;
pub use repository::{MessageRepository, RoomRepository};
pub use value_object::{GroupKey, MessageBody, MessageId, RoomId, Timestamp, UserId};
