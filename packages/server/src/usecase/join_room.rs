//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - アクセス権の確認、ルームキーへの購読、ENTER の配信
//!
//! ### どのような状況を想定しているか
//! - 正常系：公開ルームへの参加、スタッフによるスタッフ限定ルームへの参加
//! - 異常系：一般ユーザーによるスタッフ限定ルームへの参加、存在しないルーム
//! - エッジケース：同じルームへの二重参加

use std::sync::Arc;

use crate::domain::{GroupBroadcaster, MessageType, Room, RoomId, RoomRepository};

use super::{
    error::RoomAccessError,
    room_access::{load_accessible_room, publish_room_frame},
    session::ParticipantSession,
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    rooms: Arc<dyn RoomRepository>,
    broadcaster: Arc<dyn GroupBroadcaster>,
}

impl JoinRoomUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, broadcaster: Arc<dyn GroupBroadcaster>) -> Self {
        Self { rooms, broadcaster }
    }

    /// ルーム参加を実行
    ///
    /// 参加済みの場合は購読も配信も行わずにルームを返す。
    pub async fn execute(
        &self,
        session: &mut ParticipantSession,
        room_id: i64,
    ) -> Result<Room, RoomAccessError> {
        let room_id = RoomId::new(room_id)?;
        let room = load_accessible_room(self.rooms.as_ref(), session.identity(), room_id).await?;
        if session.has_joined(room.id) {
            return Ok(room);
        }

        self.broadcaster
            .subscribe(session.connection(), &room.group_name())
            .await;
        session.mark_joined(room.id);
        publish_room_frame(
            self.broadcaster.as_ref(),
            &room,
            session.identity(),
            "joined".to_string(),
            MessageType::Enter,
        )
        .await;
        tracing::info!(user = %session.identity().id, room = %room.id, "Joined room");

        Ok(room)
    }
}
