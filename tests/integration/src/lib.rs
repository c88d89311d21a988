//! Integration test utilities for the inbox server
//!
//! Spawns the full server (REST and gateway) on an ephemeral port over
//! in-memory storage and provides HTTP and WebSocket clients for it.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
