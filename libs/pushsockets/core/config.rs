use crate::traits::*;
use std::sync::Arc;
use std::time::Duration;

/// Default time allowed for the TCP + WebSocket handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a PushTransport
#[derive(Clone)]
pub struct TransportConfig {
    /// WebSocket URL (wss:// or ws://)
    pub(crate) url: String,

    /// Optional passive ping detector for server heartbeat probes
    pub(crate) passive_ping: Option<Arc<dyn PassivePingDetector>>,

    /// Connect attempts that take longer than this surface as an error event
    pub(crate) connect_timeout: Duration,
}

impl TransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            passive_ping: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Answer server probes matched by `detector` inside the transport
    pub fn with_passive_ping(mut self, detector: Arc<dyn PassivePingDetector>) -> Self {
        self.passive_ping = Some(detector);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Get a reference to the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Check if passive ping detection is configured
    pub fn has_passive_ping(&self) -> bool {
        self.passive_ping.is_some()
    }
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("url", &self.url)
            .field("passive_ping", &self.passive_ping.is_some())
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
