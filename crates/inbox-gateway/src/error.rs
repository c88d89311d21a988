//! Gateway error types

use inbox_service::ServiceError;
use thiserror::Error;

use crate::protocol::CloseCode;

/// Gateway error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing, invalid or expired token, or the user is unknown
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    /// Not a participant, or the conversation does not exist
    #[error("Forbidden")]
    Forbidden,

    /// Inbound frame is not the expected JSON
    #[error("Invalid JSON format")]
    MalformedPayload,

    /// Inbound message rejected by validation
    #[error("{0}")]
    InvalidMessage(String),

    /// Storing the message failed
    #[error("Failed to send message")]
    SendFailed(#[source] ServiceError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Close code for errors that end the connection; `None` for errors
    /// reported to the client as an error frame
    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            Self::Unauthenticated(_) => Some(CloseCode::Unauthenticated),
            Self::Forbidden => Some(CloseCode::Forbidden),
            Self::Internal(_) => Some(CloseCode::UnknownError),
            Self::MalformedPayload | Self::InvalidMessage(_) | Self::SendFailed(_) => None,
        }
    }

    /// Text of the error frame sent to the client
    pub fn client_message(&self) -> String {
        self.to_string()
    }

    /// Classify a failure while joining a room
    pub fn from_join(err: ServiceError) -> Self {
        if err.is_unauthenticated() {
            Self::Unauthenticated(err.to_string())
        } else if err.is_access_denied() {
            Self::Forbidden
        } else {
            Self::Internal(err.to_string())
        }
    }

    /// Classify a failure while sending a message on an active connection
    pub fn from_send(err: ServiceError) -> Self {
        if err.status_code() == 400 {
            Self::InvalidMessage(err.to_string())
        } else {
            Self::SendFailed(err)
        }
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
