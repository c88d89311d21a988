//! # inbox-api
//!
//! HTTP surface for direct messaging: the `/api/v1` REST routes, health
//! probes and the live conversation gateway, served from one listener.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{assemble, build_state, create_app, run, serve, AppParts, Storage};
pub use state::AppState;
