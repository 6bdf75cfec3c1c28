//! Group-keyed fan-out engine.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Weak},
};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, trace, warn};

use crate::domain::{
    ConnectionHandle, ConnectionId, DeliveryFailure, GroupBroadcaster, GroupKey, Payload,
};

use super::transport::{BroadcastTransport, Envelope, NodeId};

/// Subscription state of one node.
///
/// `groups` and `memberships` are two views of the same relation and are
/// always updated together.
#[derive(Default)]
struct Registry {
    groups: HashMap<GroupKey, HashMap<ConnectionId, ConnectionHandle>>,
    memberships: HashMap<ConnectionId, HashSet<GroupKey>>,
}

impl Registry {
    fn insert(&mut self, connection: &ConnectionHandle, key: &GroupKey) -> bool {
        let added = self
            .groups
            .entry(key.clone())
            .or_default()
            .insert(connection.id(), connection.clone())
            .is_none();
        self.memberships
            .entry(connection.id())
            .or_default()
            .insert(key.clone());
        added
    }

    fn remove(&mut self, id: ConnectionId, key: &GroupKey) -> bool {
        let removed = match self.groups.get_mut(key) {
            Some(members) => {
                let removed = members.remove(&id).is_some();
                if members.is_empty() {
                    self.groups.remove(key);
                }
                removed
            }
            None => false,
        };
        if let Some(keys) = self.memberships.get_mut(&id) {
            keys.remove(key);
            if keys.is_empty() {
                self.memberships.remove(&id);
            }
        }
        removed
    }

    fn remove_all(&mut self, id: ConnectionId) -> usize {
        let Some(keys) = self.memberships.remove(&id) else {
            return 0;
        };
        for key in &keys {
            if let Some(members) = self.groups.get_mut(key) {
                members.remove(&id);
                if members.is_empty() {
                    self.groups.remove(key);
                }
            }
        }
        keys.len()
    }

    fn snapshot(&self, key: &GroupKey) -> Vec<ConnectionHandle> {
        self.groups
            .get(key)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }
}

/// Maps broadcast keys to the live connections of this node and fans
/// payloads out to them.
///
/// Locks are only held while the registry is read or mutated, never while
/// payloads are handed to connections. Delivery uses each connection's
/// bounded buffer without waiting; a connection whose buffer is full is
/// evicted from every group.
pub struct BroadcastEngine {
    node_id: NodeId,
    registry: RwLock<Registry>,
    transport: Arc<dyn BroadcastTransport>,
}

impl BroadcastEngine {
    pub fn new(transport: Arc<dyn BroadcastTransport>) -> Self {
        Self {
            node_id: NodeId::generate(),
            registry: RwLock::new(Registry::default()),
            transport,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Number of local connections subscribed to `key`.
    pub async fn group_size(&self, key: &GroupKey) -> usize {
        let registry = self.registry.read().await;
        registry.groups.get(key).map_or(0, HashMap::len)
    }

    /// Number of local connections holding at least one subscription.
    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.memberships.len()
    }

    /// Start delivering envelopes published by other nodes.
    ///
    /// The relay stops when the transport closes or the engine is dropped.
    pub fn spawn_relay(self: &Arc<Self>) -> JoinHandle<()> {
        let engine: Weak<Self> = Arc::downgrade(self);
        let node_id = self.node_id;
        let mut envelopes = self.transport.subscribe();

        tokio::spawn(async move {
            while let Some(envelope) = envelopes.next().await {
                if envelope.origin == node_id {
                    continue;
                }
                let Some(engine) = engine.upgrade() else {
                    break;
                };
                let delivered = engine.deliver_local(&envelope.key, &envelope.payload).await;
                trace!(
                    key = %envelope.key,
                    origin = %envelope.origin,
                    delivered,
                    "Relayed remote publish"
                );
            }
            debug!(node = %node_id, "Broadcast relay stopped");
        })
    }

    async fn deliver_local(&self, key: &GroupKey, payload: &Payload) -> usize {
        let targets = self.registry.read().await.snapshot(key);

        let mut delivered = 0;
        let mut dropped = Vec::new();
        for connection in targets {
            match connection.try_deliver(payload) {
                Ok(()) => delivered += 1,
                Err(DeliveryFailure::Full) => {
                    warn!(conn_id = %connection.id(), key = %key, "Disconnecting slow subscriber");
                    dropped.push((connection, true));
                }
                Err(DeliveryFailure::Closed) => {
                    debug!(conn_id = %connection.id(), key = %key, "Pruning closed subscriber");
                    dropped.push((connection, false));
                }
            }
        }

        if !dropped.is_empty() {
            let mut registry = self.registry.write().await;
            for (connection, _) in &dropped {
                registry.remove_all(connection.id());
            }
        }
        for (connection, slow) in dropped {
            if slow {
                connection.evict();
            }
        }

        delivered
    }
}

#[async_trait]
impl GroupBroadcaster for BroadcastEngine {
    async fn subscribe(&self, connection: &ConnectionHandle, key: &GroupKey) {
        let added = self.registry.write().await.insert(connection, key);
        if added {
            debug!(conn_id = %connection.id(), key = %key, "Subscribed");
        }
    }

    async fn unsubscribe(&self, connection: &ConnectionHandle, key: &GroupKey) {
        let removed = self.registry.write().await.remove(connection.id(), key);
        if removed {
            debug!(conn_id = %connection.id(), key = %key, "Unsubscribed");
        }
    }

    async fn unsubscribe_all(&self, connection: &ConnectionHandle) {
        let groups = self.registry.write().await.remove_all(connection.id());
        debug!(conn_id = %connection.id(), groups, "Unsubscribed from all groups");
    }

    async fn publish(&self, key: &GroupKey, payload: Payload) -> usize {
        let delivered = self.deliver_local(key, &payload).await;

        let envelope = Envelope {
            origin: self.node_id,
            key: key.clone(),
            payload,
        };
        if let Err(e) = self.transport.send(envelope) {
            warn!(key = %key, error = %e, "Failed to relay publish to other nodes");
        }

        debug!(key = %key, delivered, "Published");
        delivered
    }
}
