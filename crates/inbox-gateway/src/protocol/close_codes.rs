//! WebSocket close codes
//!
//! Each rejection reason has its own code so clients can tell "log in again"
//! apart from "this is not your conversation".

use serde::{Deserialize, Serialize};

/// Gateway WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Regular shutdown by either side
    Normal = 1000,
    /// Unexpected server-side failure
    UnknownError = 4000,
    /// Missing, invalid or expired token, or unknown user
    Unauthenticated = 4001,
    /// Not a participant of the conversation, or no such conversation
    Forbidden = 4003,
    /// Outbound queue overflowed; the client was not keeping up
    SlowConsumer = 4008,
    /// Nothing received from the client within the idle timeout
    SessionTimeout = 4009,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Normal),
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::Unauthenticated),
            4003 => Some(Self::Forbidden),
            4008 => Some(Self::SlowConsumer),
            4009 => Some(Self::SessionTimeout),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if the client should attempt to reconnect after this close code
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        matches!(
            self,
            Self::UnknownError | Self::SlowConsumer | Self::SessionTimeout
        )
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Normal => "Normal closure",
            Self::UnknownError => "Unknown error occurred",
            Self::Unauthenticated => "Authentication required",
            Self::Forbidden => "Not a participant of this conversation",
            Self::SlowConsumer => "Client too slow to keep up",
            Self::SessionTimeout => "Session timeout",
        }
    }

    /// Get the name of this close code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::UnknownError => "UnknownError",
            Self::Unauthenticated => "Unauthenticated",
            Self::Forbidden => "Forbidden",
            Self::SlowConsumer => "SlowConsumer",
            Self::SessionTimeout => "SessionTimeout",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
