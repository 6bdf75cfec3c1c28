//! ルーム系ユースケースの共通処理

use crate::{
    domain::{
        AuthorizationError, GroupBroadcaster, Identity, MessageType, Room, RoomId, RoomRepository,
    },
    infrastructure::dto::websocket::{RoomFrame, encode_frame},
};

use super::error::RoomAccessError;

/// ルームを取得し、スタッフ限定ルームへのアクセス権を確認する
pub(super) async fn load_accessible_room(
    rooms: &dyn RoomRepository,
    identity: &Identity,
    room_id: RoomId,
) -> Result<Room, RoomAccessError> {
    let room = rooms.find_by_id(room_id).await?;
    if !identity.can_access(&room) {
        tracing::warn!(user = %identity.id, room = %room.id, "Rejected access to staff-only room");
        return Err(AuthorizationError::StaffOnly(room.id).into());
    }
    Ok(room)
}

/// ルームのメンバー全員へフレームを配信する
pub(super) async fn publish_room_frame(
    broadcaster: &dyn GroupBroadcaster,
    room: &Room,
    identity: &Identity,
    message: String,
    msg_type: MessageType,
) -> usize {
    let frame = RoomFrame {
        room: room.id,
        user: identity.id,
        message,
        msg_type,
    };
    match encode_frame(&frame) {
        Ok(payload) => broadcaster.publish(&room.group_name(), payload).await,
        Err(e) => {
            tracing::error!(room = %room.id, error = %e, "Failed to encode room frame");
            0
        }
    }
}
