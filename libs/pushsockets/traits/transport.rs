//! Transport abstraction
//!
//! A transport owns exactly one physical connection. It reports everything
//! that happens to that connection through an event sink handed over at
//! construction; none of its operations return errors to the caller.

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Events emitted by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is open
    Connected,
    /// A text frame arrived (passive pings are filtered out before this)
    Message(String),
    /// Connect, send or read failed
    Error(String),
    /// The connection is gone
    Closed {
        code: u16,
        reason: String,
        clean: bool,
    },
}

/// Sink that receives transport events
pub type EventSender = UnboundedSender<TransportEvent>;

/// One physical push connection
///
/// All methods are non-blocking. `connect` completes asynchronously via
/// `TransportEvent::Connected` or `TransportEvent::Error`.
pub trait Transport: Send + Sync {
    /// Open the connection
    fn connect(&self);

    /// Write one already-serialized text frame
    ///
    /// Emits `TransportEvent::Error` when the transport is not connected.
    fn send(&self, payload: String);

    /// Drop the event sink and release the connection
    ///
    /// Idempotent and valid from any state, including before `connect`
    /// completes. No events are emitted after this returns.
    fn close(&self);

    /// Whether the socket is currently open
    fn is_connected(&self) -> bool;
}

/// Creates transports wired to an event sink
pub trait TransportFactory: Send + Sync {
    fn create(&self, events: EventSender) -> Arc<dyn Transport>;
}
