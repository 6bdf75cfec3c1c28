//! UseCase: メッセージ作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateMessageUseCase::execute() メソッド
//! - 本文の正規化、種別の検証、受信者の解決、保存、通知のファンアウト
//!
//! ### なぜこのテストが必要か
//! - 通知は新規作成時にちょうど 1 回（受信者と送信者の各キーへ）だけ発生することを保証
//! - 保存に失敗した場合は通知もジョブ投入も行われないことを確認
//! - バックグラウンドジョブの投入失敗が作成を失敗させないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ作成と通知
//! - 異常系：未知の種別、存在しない受信者、保存失敗、ジョブキュー停止
//! - エッジケース：自分宛てのメッセージ

use std::sync::Arc;

use hiroba_shared::time::MonotonicClock;

use crate::{
    domain::{
        AuthorizationError, GroupBroadcaster, GroupKey, IdentityProvider, Job, JobDispatcher,
        Message, MessageFactory, MessageRepository, Timestamp, UserId,
    },
    infrastructure::dto::websocket::{NotificationFrame, encode_frame},
};

use super::error::CreateMessageError;

/// メッセージ作成のユースケース
pub struct CreateMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    identities: Arc<dyn IdentityProvider>,
    broadcaster: Arc<dyn GroupBroadcaster>,
    dispatcher: Arc<dyn JobDispatcher>,
    clock: Arc<MonotonicClock>,
}

impl CreateMessageUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        identities: Arc<dyn IdentityProvider>,
        broadcaster: Arc<dyn GroupBroadcaster>,
        dispatcher: Arc<dyn JobDispatcher>,
        clock: Arc<MonotonicClock>,
    ) -> Self {
        Self {
            repository,
            identities,
            broadcaster,
            dispatcher,
            clock,
        }
    }

    /// メッセージ作成を実行
    ///
    /// 保存に成功した場合のみ、受信者と送信者のキーへ `{"text": "<id>"}` を配信する。
    ///
    /// # Errors
    ///
    /// * `CreateMessageError::Validation` - 種別が未知
    /// * `CreateMessageError::Authorization` - 受信者が存在しない
    /// * `CreateMessageError::Persistence` - 保存に失敗
    pub async fn execute(
        &self,
        author: UserId,
        recipient: UserId,
        body: &str,
        message_type: Option<i64>,
    ) -> Result<Message, CreateMessageError> {
        let timestamp = Timestamp::new(self.clock.now_millis());
        let draft = MessageFactory::draft(author, recipient, body, message_type, timestamp)?;
        if self.identities.resolve(recipient).await?.is_none() {
            return Err(AuthorizationError::UnknownIdentity(recipient).into());
        }

        let message = self.repository.insert(draft).await?;
        tracing::info!(
            message_id = %message.id,
            author = %message.author,
            recipient = %message.recipient,
            "Message created"
        );

        self.notify(&message).await;
        self.submit_followup(&message);

        Ok(message)
    }

    async fn notify(&self, message: &Message) {
        let payload = match encode_frame(&NotificationFrame::for_message(message)) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(message_id = %message.id, error = %e, "Failed to encode notification");
                return;
            }
        };

        for key in [
            GroupKey::for_user(message.recipient),
            GroupKey::for_user(message.author),
        ] {
            let delivered = self.broadcaster.publish(&key, Arc::clone(&payload)).await;
            tracing::debug!(message_id = %message.id, key = %key, delivered, "Notified");
        }
    }

    fn submit_followup(&self, message: &Message) {
        let job = Job::MessageCreated {
            message_id: message.id,
            author: message.author,
            recipient: message.recipient,
            characters: message.characters(),
        };
        if let Err(e) = self.dispatcher.dispatch(job) {
            tracing::warn!(message_id = %message.id, error = %e, "Failed to dispatch follow-up job");
        }
    }
}
