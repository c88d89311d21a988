//! JSON text frames
//!
//! Client to server: `{"message": "<text>"}`.
//! Server to client: `{"message": {...}}` for a broadcast message, or
//! `{"error": "<reason>"}` for a rejected send. Error frames never close
//! the connection.

use std::sync::Arc;

use inbox_service::dto::MessageResponse;
use serde::{Deserialize, Serialize};

/// Inbound send request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientFrame {
    /// A missing field reads as an empty body
    #[serde(default)]
    pub message: String,
}

impl ClientFrame {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Wire shape of a server frame
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ServerFrame<'a> {
    Message { message: &'a MessageResponse },
    Error { error: &'a str },
}

/// Item on a session's outbound queue
#[derive(Debug, Clone)]
pub enum OutboundFrame {
    /// Broadcast message, shared between every session of the room
    Message(Arc<MessageResponse>),
    /// Error addressed to this session only
    Error(String),
}

impl OutboundFrame {
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    pub fn as_wire(&self) -> ServerFrame<'_> {
        match self {
            Self::Message(message) => ServerFrame::Message {
                message: message.as_ref(),
            },
            Self::Error(error) => ServerFrame::Error {
                error: error.as_str(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.as_wire())
    }
}
