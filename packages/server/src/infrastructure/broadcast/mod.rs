//! Group fan-out over live connections.
//!
//! [`BroadcastEngine`] keeps the per-process subscription registry and
//! relays every publish through a [`BroadcastTransport`] so engines in other
//! processes can deliver to their own subscribers.

pub mod engine;
pub mod transport;

pub use engine::BroadcastEngine;
pub use transport::{BroadcastTransport, Envelope, InMemoryTransport, NodeId, TransportError};
