use thiserror::Error;

/// Main error type for pushsockets
///
/// Transport operations never return these to the caller directly; they are
/// rendered into `TransportEvent::Error` reasons. The enum keeps the failure
/// categories distinct in logs and tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The WebSocket handshake or TCP connect failed
    #[error("Failed to connect to {url}: {reason}")]
    ConnectFailed { url: String, reason: String },

    /// Connect did not complete within the configured timeout
    #[error("Connect to {0} timed out")]
    ConnectTimeout(String),

    /// A frame was sent while no connection is open
    #[error("Can't send frame: not connected")]
    NotConnected,

    /// Writing a frame to the socket failed
    #[error("Failed to send frame: {0}")]
    SendFailed(String),

    /// Reading from the socket failed
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

/// Result type for pushsockets operations
pub type Result<T> = std::result::Result<T, TransportError>;
