//! Transport implementation
//!
//! ```text
//! ┌──────────────┐  command channel  ┌─────────────────────┐
//! │ PushTransport│ ────────────────> │  I/O task (tokio)   │ <──> WebSocket
//! │  connect()   │                   │  handshake          │
//! │  send()      │                   │  passive ping reply │
//! │  close()     │                   │  frame pump         │
//! └──────────────┘                   └──────────┬──────────┘
//!                                               │ TransportEvent
//!                                               ▼
//!                                          event sink (owner)
//! ```

pub mod client;
pub mod config;
pub mod connection_state;

pub use client::{PushTransport, PushTransportFactory};
pub use config::TransportConfig;
pub use connection_state::{AtomicConnectionState, ConnectionState};

pub use crate::traits::*;
