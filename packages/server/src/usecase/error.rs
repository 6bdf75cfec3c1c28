//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{AuthorizationError, PersistenceError, RoomId, ValidationError};

/// メッセージ作成のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreateMessageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 受信者が存在しない
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// メッセージ更新のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateMessageError {
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// ルーム参加・退出・投稿のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomAccessError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// 参加していないルームへの操作
    #[error("Room {0} has not been joined")]
    NotJoined(RoomId),
}

/// 接続時のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
