//! Message fan-out
//!
//! Routes published messages to the outbound queues of a room's sessions.

mod broadcaster;

pub use broadcaster::Broadcaster;
