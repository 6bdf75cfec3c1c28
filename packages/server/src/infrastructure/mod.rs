//! Infrastructure layer.
//!
//! Concrete implementations of the ports defined by the domain layer,
//! plus the DTOs used on the wire.

pub mod broadcast;
pub mod dispatcher;
pub mod dto;
pub mod identity;
pub mod repository;

pub use broadcast::{BroadcastEngine, BroadcastTransport, InMemoryTransport};
pub use dispatcher::{ActivityLogHandler, TokioJobDispatcher};
pub use identity::InMemoryIdentityProvider;
pub use repository::{InMemoryMessageRepository, InMemoryRoomRepository};
