//! WebSocket chat server implementation.

mod handler;
pub mod protocol_error;
mod runner;
mod signal;
pub mod state;

pub use runner::{RunError, RunningServer, router, run, start};
