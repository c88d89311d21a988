//! Connection lifecycle

use serde::{Deserialize, Serialize};

/// Connection state
///
/// `Connecting -> Authenticated -> Authorized -> Active -> Closed`. Any state
/// may jump straight to `Closed`; nothing leaves `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Upgraded, credentials not yet checked
    Connecting,
    /// Token resolved to a known user
    Authenticated,
    /// User is a participant of the requested conversation
    Authorized,
    /// Joined the room, sending and receiving
    Active,
    Closed,
}

impl ConnectionState {
    /// Whether moving to `next` is a legal transition
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::Authenticated)
                | (Self::Authenticated, Self::Authorized)
                | (Self::Authorized, Self::Active)
                | (
                    Self::Connecting | Self::Authenticated | Self::Authorized | Self::Active,
                    Self::Closed
                )
        )
    }

    /// Advance to `next`, or stay put if the transition is illegal
    pub fn advance(&mut self, next: Self) -> bool {
        if self.can_transition_to(next) {
            *self = next;
            true
        } else {
            false
        }
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}
