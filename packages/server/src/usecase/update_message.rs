//! UseCase: メッセージ更新処理
//!
//! 作成とは別の操作として扱い、通知は一切行わない。

use std::sync::Arc;

use crate::domain::{
    AuthorizationError, Message, MessageBody, MessageId, MessageRepository, UserId,
};

use super::error::UpdateMessageError;

/// メッセージ更新のユースケース
pub struct UpdateMessageUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl UpdateMessageUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// 本文を差し替える。タイムスタンプ・送信者・受信者・種別は変わらない。
    ///
    /// # Errors
    ///
    /// * `UpdateMessageError::Authorization` - 編集者が送信者ではない
    /// * `UpdateMessageError::Persistence` - メッセージが存在しない、または保存に失敗
    pub async fn execute(
        &self,
        editor: UserId,
        id: MessageId,
        body: &str,
    ) -> Result<Message, UpdateMessageError> {
        let body = MessageBody::new(body);
        let current = self.repository.find_by_id(id).await?;
        if current.author != editor {
            return Err(AuthorizationError::NotAuthor(id).into());
        }

        let updated = self.repository.update(current.with_body(body)).await?;
        tracing::info!(message_id = %updated.id, "Message updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ConnectionHandle, GroupBroadcaster, GroupKey, MessageFactory, PersistenceError,
            Timestamp, dispatcher::MockJobDispatcher,
        },
        infrastructure::{
            BroadcastEngine, InMemoryIdentityProvider, InMemoryMessageRepository,
            InMemoryTransport,
        },
        usecase::CreateMessageUseCase,
    };
    use hiroba_shared::time::MonotonicClock;

    fn user(id: i64) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_update_publishes_nothing() {
        // テスト項目: 更新では通知が発生しない
        // given (前提条件): 作成済みのメッセージと購読中の接続
        let repository = Arc::new(InMemoryMessageRepository::new());
        let engine = Arc::new(BroadcastEngine::new(Arc::new(InMemoryTransport::default())));
        let mut dispatcher = MockJobDispatcher::new();
        dispatcher.expect_dispatch().returning(|_| Ok(()));
        let create = CreateMessageUseCase::new(
            repository.clone(),
            Arc::new(InMemoryIdentityProvider::default()),
            engine.clone(),
            Arc::new(dispatcher),
            Arc::new(MonotonicClock::new()),
        );
        let (recipient_conn, mut recipient_rx) = ConnectionHandle::channel(8);
        engine
            .subscribe(&recipient_conn, &GroupKey::for_user(user(2)))
            .await;
        let created = create.execute(user(1), user(2), "first", None).await.unwrap();
        assert!(recipient_rx.try_recv().is_ok());

        // when (操作):
        let update = UpdateMessageUseCase::new(repository.clone());
        let updated = update
            .execute(user(1), created.id, "  second ")
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(updated.body.as_str(), "second");
        assert_eq!(updated.timestamp, created.timestamp);
        assert!(recipient_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_only_author_may_update() {
        // テスト項目: 送信者以外は更新できない
        let repository = Arc::new(InMemoryMessageRepository::new());
        let stored = repository
            .insert(MessageFactory::draft(user(1), user(2), "mine", None, Timestamp::new(0)).unwrap())
            .await
            .unwrap();
        let update = UpdateMessageUseCase::new(repository.clone());

        let result = update.execute(user(2), stored.id, "theirs").await;

        assert_eq!(
            result,
            Err(UpdateMessageError::Authorization(
                AuthorizationError::NotAuthor(stored.id)
            ))
        );
        let unchanged = repository.find_by_id(stored.id).await.unwrap();
        assert_eq!(unchanged.body.as_str(), "mine");
    }

    #[tokio::test]
    async fn test_update_missing_message_fails() {
        // テスト項目: 存在しないメッセージの更新は失敗する
        let update = UpdateMessageUseCase::new(Arc::new(InMemoryMessageRepository::new()));
        let id = MessageId::new(9).unwrap();

        let result = update.execute(user(1), id, "x").await;

        assert_eq!(
            result,
            Err(UpdateMessageError::Persistence(
                PersistenceError::MessageNotFound(id)
            ))
        );
    }
}
