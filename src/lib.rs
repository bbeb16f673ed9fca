//! Order Status Tracker - Main Library
//!
//! Re-exports the workspace libraries and hosts the helpers shared by the
//! binaries.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI parsing)
//! - **ordertrack**: Trackers, multiplexer and poller (re-exported from workspace)
//! - **pushsockets**: Push WebSocket transport (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use order_status_tracker::bin_common::{load_config_from_env, ConfigType};
//! use order_status_tracker::ordertrack::TrackingContext;
//! ```

// Re-export workspace libraries for convenience
pub use ordertrack;
pub use pushsockets;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{load_config_from_env, parse_args, ConfigType, TrackArgs, ACCESS_TOKEN_ENV};
}
