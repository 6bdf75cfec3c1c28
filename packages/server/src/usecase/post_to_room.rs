//! UseCase: ルーム投稿処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PostToRoomUseCase::execute() メソッド
//! - 参加確認、本文の正規化、種別の検証、ルームへの配信
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加中のルームへの投稿
//! - 異常系：未参加のルーム、未知の種別

use std::sync::Arc;

use crate::domain::{GroupBroadcaster, MessageBody, MessageType, RoomId, RoomRepository};

use super::{
    error::RoomAccessError,
    room_access::{load_accessible_room, publish_room_frame},
    session::ParticipantSession,
};

/// ルーム投稿のユースケース
pub struct PostToRoomUseCase {
    rooms: Arc<dyn RoomRepository>,
    broadcaster: Arc<dyn GroupBroadcaster>,
}

impl PostToRoomUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, broadcaster: Arc<dyn GroupBroadcaster>) -> Self {
        Self { rooms, broadcaster }
    }

    /// ルーム投稿を実行
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - このサーバー上で配信した接続数
    pub async fn execute(
        &self,
        session: &ParticipantSession,
        room_id: i64,
        body: &str,
        message_type: Option<i64>,
    ) -> Result<usize, RoomAccessError> {
        let room_id = RoomId::new(room_id)?;
        if !session.has_joined(room_id) {
            return Err(RoomAccessError::NotJoined(room_id));
        }
        let msg_type = match message_type {
            Some(raw) => MessageType::try_from(raw)?,
            None => MessageType::default(),
        };
        let body = MessageBody::new(body);
        let room = load_accessible_room(self.rooms.as_ref(), session.identity(), room_id).await?;

        let delivered = publish_room_frame(
            self.broadcaster.as_ref(),
            &room,
            session.identity(),
            body.into_string(),
            msg_type,
        )
        .await;
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ConnectionHandle, Identity, Payload, RoomFactory, Timestamp, UserId, ValidationError,
        },
        infrastructure::{BroadcastEngine, InMemoryRoomRepository, InMemoryTransport},
        usecase::JoinRoomUseCase,
    };
    use tokio::sync::mpsc;

    fn session(user: i64) -> (ParticipantSession, mpsc::Receiver<Payload>) {
        let (connection, rx) = ConnectionHandle::channel(8);
        let identity = Identity {
            id: UserId::new(user).unwrap(),
            is_staff: false,
        };
        (ParticipantSession::new(identity, connection), rx)
    }

    struct Fixture {
        post: PostToRoomUseCase,
        join: JoinRoomUseCase,
    }

    async fn fixture() -> Fixture {
        let rooms = Arc::new(InMemoryRoomRepository::new());
        rooms
            .insert(RoomFactory::draft("General", false, Timestamp::new(0)))
            .await
            .unwrap();
        let engine = Arc::new(BroadcastEngine::new(Arc::new(InMemoryTransport::default())));
        Fixture {
            post: PostToRoomUseCase::new(rooms.clone(), engine.clone()),
            join: JoinRoomUseCase::new(rooms, engine),
        }
    }

    #[tokio::test]
    async fn test_post_reaches_every_member() {
        // テスト項目: 投稿が参加中の全メンバーに届く
        // given (前提条件):
        let fixture = fixture().await;
        let (mut alice, mut alice_rx) = session(1);
        let (mut bob, mut bob_rx) = session(2);
        fixture.join.execute(&mut alice, 1).await.unwrap();
        fixture.join.execute(&mut bob, 1).await.unwrap();
        while alice_rx.try_recv().is_ok() {}
        while bob_rx.try_recv().is_ok() {}

        // when (操作):
        let delivered = fixture.post.execute(&alice, 1, "  careful  ", Some(1)).await.unwrap();

        // then (期待する結果):
        assert_eq!(delivered, 2);
        let frame: serde_json::Value = serde_json::from_str(&bob_rx.try_recv().unwrap()).unwrap();
        assert_eq!(
            frame,
            serde_json::json!({"room": 1, "user": 1, "message": "careful", "msg_type": 1})
        );
        assert!(alice_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_post_without_joining_fails() {
        // テスト項目: 参加していないルームには投稿できない
        let fixture = fixture().await;
        let (alice, _rx) = session(1);

        let result = fixture.post.execute(&alice, 1, "hi", None).await;

        assert_eq!(result, Err(RoomAccessError::NotJoined(RoomId::new(1).unwrap())));
    }

    #[tokio::test]
    async fn test_post_with_unknown_type_fails() {
        // テスト項目: 未知の種別での投稿は ValidationError になる
        let fixture = fixture().await;
        let (mut alice, _rx) = session(1);
        fixture.join.execute(&mut alice, 1).await.unwrap();

        let result = fixture.post.execute(&alice, 1, "hi", Some(99)).await;

        assert_eq!(
            result,
            Err(RoomAccessError::Validation(ValidationError::UnknownMessageType(99)))
        );
    }
}
