//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::resolve() / execute() メソッド
//! - 参加者の接続処理（ID の解決、個人キーへの購読）
//!
//! ### なぜこのテストが必要か
//! - ID の解決はハンドシェイク前、購読はハンドシェイク完了後に行うため、
//!   解決だけでは購読が発生しないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：既知の ID での接続
//! - 異常系：未知の ID、ID プロバイダの障害

use std::sync::Arc;

use crate::domain::{
    AuthorizationError, ConnectionHandle, GroupBroadcaster, GroupKey, Identity, IdentityProvider,
    UserId,
};

use super::{error::ConnectError, session::ParticipantSession};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    identities: Arc<dyn IdentityProvider>,
    broadcaster: Arc<dyn GroupBroadcaster>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        identities: Arc<dyn IdentityProvider>,
        broadcaster: Arc<dyn GroupBroadcaster>,
    ) -> Self {
        Self {
            identities,
            broadcaster,
        }
    }

    /// 接続を受け入れる前に ID を解決する。購読は行わない。
    ///
    /// # Errors
    ///
    /// * `ConnectError::Authorization` - 未知の ID
    /// * `ConnectError::Persistence` - ID プロバイダの障害
    pub async fn resolve(&self, user_id: UserId) -> Result<Identity, ConnectError> {
        let identity = self
            .identities
            .resolve(user_id)
            .await?
            .ok_or(AuthorizationError::UnknownIdentity(user_id))?;
        Ok(identity)
    }

    /// 参加者接続を実行
    ///
    /// 確立済みの接続を本人のキーへ購読させる。
    pub async fn execute(
        &self,
        identity: Identity,
        connection: ConnectionHandle,
    ) -> ParticipantSession {
        self.broadcaster
            .subscribe(&connection, &GroupKey::for_user(identity.id))
            .await;
        tracing::info!(user = %identity.id, conn_id = %connection.id(), "Participant connected");

        ParticipantSession::new(identity, connection)
    }
}
