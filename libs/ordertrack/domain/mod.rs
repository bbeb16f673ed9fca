//! Domain types shared by the multiplexer, poller and trackers

pub mod messages;
pub mod order;

pub use messages::{ConnectionHandshake, PushEnvelope, PushFrame};
pub use order::{OrderId, OrderSnapshot, OrderStatus};
