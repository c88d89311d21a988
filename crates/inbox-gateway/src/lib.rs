//! # inbox-gateway
//!
//! WebSocket gateway for live conversation rooms.
//!
//! A client connects to `/ws/conversations/{id}?token=...`, is authenticated
//! and authorized, joins the conversation's room in the [`SessionRegistry`]
//! and from then on receives every message published to that room through
//! its own bounded outbound queue.

pub mod broadcast;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod server;

pub use broadcast::Broadcaster;
pub use connection::{ConnectionState, Session, SessionId, SessionRegistry};
pub use error::GatewayError;
pub use protocol::{ClientFrame, CloseCode, OutboundFrame, ServerFrame};
pub use server::{gateway_routes, spawn_sweeper, GatewayState};
