//! Group fan-out port and the connection handle it operates on.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};
use uuid::Uuid;

use super::value_object::GroupKey;

/// Serialized frame delivered to subscribers.
pub type Payload = Arc<str>;

/// Identifier of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a payload could not be handed to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The connection's buffer is full
    Full,
    /// The receiving side is gone
    Closed,
}

/// Sending half of a live connection.
///
/// Cloning is cheap; all clones refer to the same connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<Payload>,
    evicted: Arc<Notify>,
}

impl ConnectionHandle {
    /// Create a handle and the receiver the socket writer drains.
    ///
    /// `capacity` bounds how many undelivered payloads may queue up before
    /// the connection counts as too slow.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Payload>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = Self {
            id: ConnectionId::generate(),
            sender,
            evicted: Arc::new(Notify::new()),
        };
        (handle, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Non-blocking delivery.
    pub fn try_deliver(&self, payload: &Payload) -> Result<(), DeliveryFailure> {
        self.sender
            .try_send(Arc::clone(payload))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => DeliveryFailure::Full,
                mpsc::error::TrySendError::Closed(_) => DeliveryFailure::Closed,
            })
    }

    /// Signal the owner of this connection that it has been dropped from fan-out.
    pub fn evict(&self) {
        self.evicted.notify_one();
    }

    /// Resolves once [`evict`](Self::evict) has been called.
    pub async fn evicted(&self) {
        self.evicted.notified().await;
    }
}

/// Group-keyed publish/subscribe over live connections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupBroadcaster: Send + Sync {
    /// Add the connection to the group. Idempotent.
    async fn subscribe(&self, connection: &ConnectionHandle, key: &GroupKey);

    /// Remove the connection from the group. No-op if absent.
    async fn unsubscribe(&self, connection: &ConnectionHandle, key: &GroupKey);

    /// Remove the connection from every group it belongs to.
    async fn unsubscribe_all(&self, connection: &ConnectionHandle);

    /// Deliver `payload` to the group's current members.
    ///
    /// Returns the number of local connections the payload was handed to.
    async fn publish(&self, key: &GroupKey, payload: Payload) -> usize;
}
