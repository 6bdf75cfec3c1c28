//! Server configuration.

use std::net::SocketAddr;

use crate::domain::UserId;

/// Default per-connection buffer of undelivered frames.
pub const DEFAULT_DELIVERY_BUFFER: usize = 64;

/// Runtime settings for one server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Frames a connection may have queued before it counts as too slow
    pub delivery_buffer: usize,
    /// Identities holding the staff privilege
    pub staff: Vec<UserId>,
    /// Rooms created at startup as `(title, staff_only)`
    pub seed_rooms: Vec<(String, bool)>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            delivery_buffer: DEFAULT_DELIVERY_BUFFER,
            staff: Vec::new(),
            seed_rooms: vec![
                ("General".to_string(), false),
                ("Staff".to_string(), true),
            ],
        }
    }
}
