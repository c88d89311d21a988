//! Gateway protocol definitions
//!
//! Close codes and the JSON text frames exchanged over a room connection.

mod close_codes;
mod frames;

pub use close_codes::CloseCode;
pub use frames::{ClientFrame, OutboundFrame, ServerFrame};
