//! Identity provider port.

use async_trait::async_trait;

use super::{entity::Identity, error::PersistenceError, value_object::UserId};

/// Resolves an opaque user id to an identity and its privilege flag.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` when the identity does not exist.
    async fn resolve(&self, id: UserId) -> Result<Option<Identity>, PersistenceError>;
}
