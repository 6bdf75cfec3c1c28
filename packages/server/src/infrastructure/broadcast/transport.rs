//! Message bus carrying published payloads between server processes.

use std::fmt;

use futures_util::stream::{self, BoxStream, StreamExt};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::{GroupKey, Payload};

/// Capacity of the in-memory bus. A relay that falls further behind skips
/// envelopes instead of slowing publishers down.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Identifier of one broadcast engine (one server process).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A published payload as it travels over the bus.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Node whose engine accepted the publish call
    pub origin: NodeId,
    pub key: GroupKey,
    pub payload: Payload,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Broadcast transport unavailable: {0}")]
    Unavailable(String),
}

/// Cross-process primitive the broadcast engine is layered on.
///
/// Every envelope sent is offered to every subscriber, including the sender's
/// own node; receivers filter by [`Envelope::origin`].
pub trait BroadcastTransport: Send + Sync {
    /// Hand an envelope to the bus without waiting for receivers.
    fn send(&self, envelope: Envelope) -> Result<(), TransportError>;

    /// Stream of every envelope sent after this call.
    fn subscribe(&self) -> BoxStream<'static, Envelope>;
}

/// Bus shared by engines living in the same address space.
pub struct InMemoryTransport {
    sender: broadcast::Sender<Envelope>,
}

impl InMemoryTransport {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl BroadcastTransport for InMemoryTransport {
    fn send(&self, envelope: Envelope) -> Result<(), TransportError> {
        // No relay listening is not a failure: there is simply no other node.
        let _ = self.sender.send(envelope);
        Ok(())
    }

    fn subscribe(&self) -> BoxStream<'static, Envelope> {
        let receiver = self.sender.subscribe();
        stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(envelope) => return Some((envelope, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Relay lagged behind the bus, envelopes dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}
