//! 接続ごとのセッション状態

use std::collections::BTreeSet;

use crate::domain::{ConnectionHandle, Identity, RoomId};

/// 1 本の WebSocket 接続に紐づく参加者の状態
#[derive(Debug, Clone)]
pub struct ParticipantSession {
    identity: Identity,
    connection: ConnectionHandle,
    joined_rooms: BTreeSet<RoomId>,
}

impl ParticipantSession {
    pub fn new(identity: Identity, connection: ConnectionHandle) -> Self {
        Self {
            identity,
            connection,
            joined_rooms: BTreeSet::new(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    pub fn has_joined(&self, room_id: RoomId) -> bool {
        self.joined_rooms.contains(&room_id)
    }

    /// 参加中のルーム（ID 順）
    pub fn joined_rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.joined_rooms.iter().copied()
    }

    pub(crate) fn mark_joined(&mut self, room_id: RoomId) -> bool {
        self.joined_rooms.insert(room_id)
    }

    pub(crate) fn mark_left(&mut self, room_id: RoomId) -> bool {
        self.joined_rooms.remove(&room_id)
    }
}
