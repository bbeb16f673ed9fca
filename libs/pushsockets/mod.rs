//! # PushSockets
//!
//! A thin push-notification transport over a single WebSocket connection.
//!
//! ## Features
//!
//! - **One connection per transport**: connect, send, close, nothing more
//! - **Event sink**: `Connected`, `Message`, `Error` and `Closed` are delivered
//!   over an unbounded tokio channel owned by whoever created the transport
//! - **Passive ping**: server heartbeat probes are answered inside the transport
//! - **No reconnection**: retry policy belongs to the layer above

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core transport functionality
pub use crate::core::{
    client, config, connection_state,
    client::{PushTransport, PushTransportFactory},
    config::TransportConfig,
    connection_state::{AtomicConnectionState, ConnectionState},
};

/// Type alias for Result with TransportError
pub type Result<T> = std::result::Result<T, traits::TransportError>;
