//! Chat server with persisted direct messages and room fan-out.
//!
//! Layers:
//! - `domain`: entities, value objects and the ports (repositories,
//!   identity, group broadcaster, job dispatcher)
//! - `usecase`: create/update messages, connect/disconnect, join/leave/post
//! - `infrastructure`: in-memory adapters, the broadcast engine and DTOs
//! - `ui`: axum router, WebSocket and HTTP handlers

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::run as run_server;
