//! Connection management
//!
//! Live sessions, their lifecycle states and the room registry.

mod registry;
mod session;
mod state;

pub use registry::SessionRegistry;
pub use session::{EnqueueError, Session, SessionId};
pub use state::ConnectionState;
