//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 参加者の切断処理（全キーからの購読解除、参加中ルームへの LEAVE 配信）
//!
//! ### なぜこのテストが必要か
//! - 切断後に通知が届き続けないことを保証
//! - 他の接続の購読に影響しないことを確認

use std::sync::Arc;

use crate::domain::{GroupBroadcaster, MessageType, RoomRepository};

use super::{room_access::publish_room_frame, session::ParticipantSession};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    rooms: Arc<dyn RoomRepository>,
    broadcaster: Arc<dyn GroupBroadcaster>,
}

impl DisconnectParticipantUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, broadcaster: Arc<dyn GroupBroadcaster>) -> Self {
        Self { rooms, broadcaster }
    }

    /// 参加者切断を実行
    ///
    /// 失敗しても他の接続に影響しないよう、エラーはログに残して処理を続ける。
    pub async fn execute(&self, session: ParticipantSession) {
        self.broadcaster.unsubscribe_all(session.connection()).await;

        for room_id in session.joined_rooms() {
            match self.rooms.find_by_id(room_id).await {
                Ok(room) => {
                    publish_room_frame(
                        self.broadcaster.as_ref(),
                        &room,
                        session.identity(),
                        "left".to_string(),
                        MessageType::Leave,
                    )
                    .await;
                }
                Err(e) => {
                    tracing::warn!(room = %room_id, error = %e, "Skipping leave notification");
                }
            }
        }

        tracing::info!(
            user = %session.identity().id,
            conn_id = %session.connection().id(),
            "Participant disconnected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionHandle, GroupKey, Identity, RoomFactory, Timestamp, UserId},
        infrastructure::{BroadcastEngine, InMemoryRoomRepository, InMemoryTransport},
        usecase::JoinRoomUseCase,
    };

    fn identity(user: i64) -> Identity {
        Identity {
            id: UserId::new(user).unwrap(),
            is_staff: false,
        }
    }

    #[tokio::test]
    async fn test_disconnect_removes_every_subscription() {
        // テスト項目: 切断すると全てのキーから購読が解除され、ルームに LEAVE が届く
        // given (前提条件): alice は個人キーとルームを購読、bob はルームのみ
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let room = rooms
            .insert(RoomFactory::draft("General", false, Timestamp::new(0)))
            .await
            .unwrap();
        let engine = Arc::new(BroadcastEngine::new(Arc::new(InMemoryTransport::default())));
        let join = JoinRoomUseCase::new(rooms.clone(), engine.clone());

        let (alice_conn, _alice_rx) = ConnectionHandle::channel(8);
        engine
            .subscribe(&alice_conn, &GroupKey::for_user(identity(1).id))
            .await;
        let mut alice = ParticipantSession::new(identity(1), alice_conn);
        join.execute(&mut alice, room.id.value()).await.unwrap();

        let (bob_conn, mut bob_rx) = ConnectionHandle::channel(8);
        let mut bob = ParticipantSession::new(identity(2), bob_conn);
        join.execute(&mut bob, room.id.value()).await.unwrap();
        while bob_rx.try_recv().is_ok() {}

        // when (操作):
        let usecase = DisconnectParticipantUseCase::new(rooms.clone(), engine.clone());
        usecase.execute(alice).await;

        // then (期待する結果):
        assert_eq!(engine.group_size(&GroupKey::for_user(identity(1).id)).await, 0);
        assert_eq!(engine.group_size(&room.group_name()).await, 1);
        assert_eq!(engine.connection_count().await, 1);
        let frame: serde_json::Value = serde_json::from_str(&bob_rx.try_recv().unwrap()).unwrap();
        assert_eq!(frame["msg_type"], 5);
    }
}
