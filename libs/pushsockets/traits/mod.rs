//! # PushSockets Traits
//!
//! Core traits and types shared by the transport implementation and its users:
//!
//! - **Transport**: connect/send/close over one physical connection
//! - **TransportFactory**: creates transports wired to an event sink
//! - **PassivePingDetector**: detect and answer server heartbeat probes
//!
//! ## Example
//!
//! ```rust,ignore
//! use pushsockets::*;
//!
//! let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
//! let transport = factory.create(events_tx);
//! transport.connect();
//!
//! while let Some(event) = events_rx.recv().await {
//!     match event {
//!         TransportEvent::Connected => transport.send(handshake.clone()),
//!         TransportEvent::Message(raw) => handle(raw),
//!         TransportEvent::Error(reason) => warn!("{}", reason),
//!         TransportEvent::Closed { .. } => break,
//!     }
//! }
//! ```

pub mod error;
pub mod passive_ping;
pub mod transport;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use passive_ping::{NoOpPassivePing, PassivePingDetector, TextPassivePing};
pub use transport::{EventSender, Transport, TransportEvent, TransportFactory};
