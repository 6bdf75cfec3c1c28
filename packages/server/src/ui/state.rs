//! Server state shared by every handler.

use std::sync::Arc;

use hiroba_shared::time::MonotonicClock;
use serde::Deserialize;

use crate::{
    domain::{GroupBroadcaster, IdentityProvider, JobDispatcher, MessageRepository, RoomRepository},
    infrastructure::BroadcastEngine,
    usecase::{
        ConnectParticipantUseCase, CreateMessageUseCase, DisconnectParticipantUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, PostToRoomUseCase, UpdateMessageUseCase,
    },
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub user_id: i64,
}

/// Shared application state
pub struct AppState {
    pub messages: Arc<dyn MessageRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub identities: Arc<dyn IdentityProvider>,
    /// Concrete engine, kept for introspection (group sizes)
    pub engine: Arc<BroadcastEngine>,
    pub dispatcher: Arc<dyn JobDispatcher>,
    pub clock: Arc<MonotonicClock>,
    /// Per-connection buffer of undelivered frames
    pub delivery_buffer: usize,
}

impl AppState {
    fn broadcaster(&self) -> Arc<dyn GroupBroadcaster> {
        self.engine.clone()
    }

    pub fn connect_usecase(&self) -> ConnectParticipantUseCase {
        ConnectParticipantUseCase::new(self.identities.clone(), self.broadcaster())
    }

    pub fn disconnect_usecase(&self) -> DisconnectParticipantUseCase {
        DisconnectParticipantUseCase::new(self.rooms.clone(), self.broadcaster())
    }

    pub fn create_message_usecase(&self) -> CreateMessageUseCase {
        CreateMessageUseCase::new(
            self.messages.clone(),
            self.identities.clone(),
            self.broadcaster(),
            self.dispatcher.clone(),
            self.clock.clone(),
        )
    }

    pub fn update_message_usecase(&self) -> UpdateMessageUseCase {
        UpdateMessageUseCase::new(self.messages.clone())
    }

    pub fn join_room_usecase(&self) -> JoinRoomUseCase {
        JoinRoomUseCase::new(self.rooms.clone(), self.broadcaster())
    }

    pub fn leave_room_usecase(&self) -> LeaveRoomUseCase {
        LeaveRoomUseCase::new(self.rooms.clone(), self.broadcaster())
    }

    pub fn post_to_room_usecase(&self) -> PostToRoomUseCase {
        PostToRoomUseCase::new(self.rooms.clone(), self.broadcaster())
    }
}
