//! UseCase: ルーム退出処理

use std::sync::Arc;

use crate::domain::{GroupBroadcaster, MessageType, RoomId, RoomRepository};

use super::{error::RoomAccessError, room_access::publish_room_frame, session::ParticipantSession};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    rooms: Arc<dyn RoomRepository>,
    broadcaster: Arc<dyn GroupBroadcaster>,
}

impl LeaveRoomUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, broadcaster: Arc<dyn GroupBroadcaster>) -> Self {
        Self { rooms, broadcaster }
    }

    /// ルーム退出を実行
    ///
    /// 購読を解除してから、残りのメンバーへ LEAVE を配信する。
    pub async fn execute(
        &self,
        session: &mut ParticipantSession,
        room_id: i64,
    ) -> Result<(), RoomAccessError> {
        let room_id = RoomId::new(room_id)?;
        if !session.has_joined(room_id) {
            return Err(RoomAccessError::NotJoined(room_id));
        }
        let room = self.rooms.find_by_id(room_id).await?;

        self.broadcaster
            .unsubscribe(session.connection(), &room.group_name())
            .await;
        session.mark_left(room.id);
        publish_room_frame(
            self.broadcaster.as_ref(),
            &room,
            session.identity(),
            "left".to_string(),
            MessageType::Leave,
        )
        .await;
        tracing::info!(user = %session.identity().id, room = %room.id, "Left room");

        Ok(())
    }
}
