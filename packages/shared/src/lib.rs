//! Shared utilities for the Hiroba chat server.
//!
//! Logger setup and time helpers used by every package in the workspace.

pub mod logger;
pub mod time;
