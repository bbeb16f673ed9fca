//! Connection multiplexer
//!
//! ```text
//! Tracker ──add/remove──> Multiplexer ──owns 0..1──> Transport
//!    ▲                        │  ▲                       │
//!    │     TrackerEvent       │  └──── TransportEvent ───┘
//!    └────────────────────────┘
//! ```
//!
//! One pump task turns transport events into tracker events; one heartbeat
//! task pings the server and watches for a connection that never comes back.

pub mod codec;
pub mod events;
pub mod liveness;
pub mod mux;

pub use codec::{decode_frame, DecodedFrame, FrameError};
pub use events::{
    MultiplexerConfig, TrackerEvent, TrackerId, TrackerRegistration, DEFAULT_HEARTBEAT_INTERVAL,
    DEFAULT_PING_THRESHOLD, DEFAULT_TIMEOUT_LIMIT, NETWORK_PROBLEMS,
};
pub use liveness::{LivenessCounter, TickOutcome};
pub use mux::Multiplexer;
