//! Error types for the dataset discovery client

use thiserror::Error;

/// Fallback shown when a transport failure carries no usable message.
pub const GENERIC_TRANSPORT_MESSAGE: &str = "The request could not be completed";

#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Network failure, timeout or non-2xx status.
    #[error("{message}")]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

impl DiscoveryError {
    /// Message suitable for a user-facing error field.
    ///
    /// Transport errors surface the backend-provided text when there is one.
    pub fn user_message(&self) -> String {
        match self {
            DiscoveryError::Transport { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            DiscoveryError::Transport { .. } => GENERIC_TRANSPORT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            DiscoveryError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryError::Decode(err.to_string())
    }
}
