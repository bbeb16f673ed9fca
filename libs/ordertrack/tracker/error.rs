use crate::poller::PollError;
use thiserror::Error;

/// Terminal failure reported to a tracker's error callback
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    #[error("order canceled")]
    Canceled,

    #[error("short polling expired")]
    Expired,

    /// The tracker task ended without completing, e.g. it panicked
    #[error("tracking stopped without a result")]
    Aborted,

    #[error(transparent)]
    Poll(#[from] PollError),
}
