use thiserror::Error;

/// Failure of one order-status request
///
/// `status_code` is the HTTP status (0 when no response arrived) and
/// `error_code` the store's own error code (0 when it sent none).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Order status request failed (status {status_code}, error code {error_code}): {message}")]
pub struct PollError {
    pub status_code: u16,
    pub error_code: i32,
    pub message: String,
}

impl PollError {
    pub fn new(status_code: u16, error_code: i32, message: impl Into<String>) -> Self {
        Self {
            status_code,
            error_code,
            message: message.into(),
        }
    }

    /// The request never got a response
    pub fn no_response(reason: impl std::fmt::Display) -> Self {
        Self::new(0, 0, format!("No response: {}", reason))
    }
}
