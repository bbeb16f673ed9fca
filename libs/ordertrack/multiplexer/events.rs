//! Events fanned out to registered trackers

use crate::domain::{OrderId, OrderStatus};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

pub type TrackerId = u64;

/// Default heartbeat period
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
/// Default number of ticks between application pings
pub const DEFAULT_PING_THRESHOLD: u32 = 1;
/// Default time without a connection before the session is declared dead
pub const DEFAULT_TIMEOUT_LIMIT: Duration = Duration::from_secs(600);

/// Reason broadcast when the heartbeat gives up on the connection
pub const NETWORK_PROBLEMS: &str = "network problems";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// A push for the order this tracker registered for
    OrderStatusUpdated {
        order_id: OrderId,
        status: OrderStatus,
        raw_status: String,
    },
    /// The transport reported an error
    ConnectionError(String),
    /// The connection is gone (transport closed or liveness timed out)
    ConnectionClosed(String),
}

/// What a tracker hands the multiplexer when it switches to push mode
#[derive(Debug, Clone)]
pub struct TrackerRegistration {
    pub id: TrackerId,
    pub order_id: OrderId,
    /// Used for the handshake if this registration opens the connection
    pub access_token: String,
    pub events: UnboundedSender<TrackerEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplexerConfig {
    pub project_id: u64,
    pub heartbeat_interval: Duration,
    pub ping_threshold: u32,
    pub timeout_limit: Duration,
}

impl MultiplexerConfig {
    pub fn new(project_id: u64) -> Self {
        Self {
            project_id,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            ping_threshold: DEFAULT_PING_THRESHOLD,
            timeout_limit: DEFAULT_TIMEOUT_LIMIT,
        }
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_ping_threshold(mut self, threshold: u32) -> Self {
        self.ping_threshold = threshold;
        self
    }

    pub fn with_timeout_limit(mut self, limit: Duration) -> Self {
        self.timeout_limit = limit;
        self
    }
}
