//! # Order Tracker
//!
//! Watches payment orders until they reach a terminal status.
//!
//! Trackers prefer the shared push connection and fall back to HTTP
//! short-polling when it fails or goes quiet. Each tracker reports exactly
//! once: success when the order is `done`, an error when it is `canceled`,
//! when polling runs past the deadline, or when a poll request fails.
//!
//! ```rust,ignore
//! use ordertrack::{TrackingConfig, TrackingContext};
//!
//! let config = TrackingConfig::load("config/tracker_config.yaml")?;
//! let context = TrackingContext::from_config(&config)?;
//! let order_id = context.track_until_terminal(12345, token, true, 300).await?;
//! ```

pub mod config;
pub mod context;
pub mod domain;
pub mod multiplexer;
pub mod poller;
pub mod tracker;
pub mod utils;

pub use config::{ConfigError, TrackingConfig};
pub use context::{ContextError, TrackingContext};
pub use domain::{OrderId, OrderSnapshot, OrderStatus, PushEnvelope};
pub use multiplexer::{Multiplexer, MultiplexerConfig, TrackerEvent, TrackerId, TrackerRegistration};
pub use poller::{HttpPoller, OrderStatusSource, PollError};
pub use tracker::{TrackerHandle, TrackerMode, TrackingError};
pub use utils::{init_tracing, ShutdownManager};
