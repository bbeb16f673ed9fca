//! Per-order tracking state machine
//!
//! ```text
//! Init ──push first──> PushTracking ──error/closed/deadline──> Polling
//!   └────poll first─────────────────────────────────────────────┘
//! PushTracking / Polling ──done/canceled/expired/poll error──> Completed
//! ```

pub mod error;
pub mod session;
pub mod state;

pub use error::TrackingError;
pub use session::{
    clamp_deadline, start_tracker, TrackerHandle, TrackerParams, DEFAULT_POLL_INTERVAL,
    MAX_POLLING_DEADLINE, MIN_POLLING_DEADLINE,
};
pub use state::{CompletionLatch, ErrorCallback, SuccessCallback, TrackerMode, TrackerState};
