//! Session-wide tracking context

use crate::config::TrackingConfig;
use crate::domain::OrderId;
use crate::multiplexer::Multiplexer;
use crate::poller::{HttpPoller, OrderStatusSource};
use crate::tracker::{start_tracker, TrackerHandle, TrackerParams, TrackingError, DEFAULT_POLL_INTERVAL};
use parking_lot::Mutex;
use pushsockets::{PushTransportFactory, TransportFactory};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Owns the shared multiplexer and the poller for one session
///
/// Build it once and start any number of trackers from it. Trackers started
/// with push enabled share a single connection.
pub struct TrackingContext {
    multiplexer: Multiplexer,
    source: Arc<dyn OrderStatusSource>,
    poll_interval: Duration,
    next_id: AtomicU64,
}

impl TrackingContext {
    pub fn new(multiplexer: Multiplexer, source: Arc<dyn OrderStatusSource>) -> Self {
        Self {
            multiplexer,
            source,
            poll_interval: DEFAULT_POLL_INTERVAL,
            next_id: AtomicU64::new(1),
        }
    }

    /// Wire up the production transport and HTTP poller from configuration
    pub fn from_config(config: &TrackingConfig) -> Result<Self, ContextError> {
        let factory: Arc<dyn TransportFactory> =
            Arc::new(PushTransportFactory::new(config.transport_config()));
        let multiplexer = Multiplexer::new(config.multiplexer_config(), factory);
        let poller = HttpPoller::with_timeouts(
            config.polling.base_url.clone(),
            config.project_id,
            Duration::from_secs(config.polling.request_timeout_secs),
            Duration::from_secs(config.polling.connect_timeout_secs),
        )?;

        Ok(Self::new(multiplexer, Arc::new(poller))
            .with_poll_interval(Duration::from_secs(config.polling.poll_interval_secs)))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn multiplexer(&self) -> &Multiplexer {
        &self.multiplexer
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Start tracking one order
    ///
    /// Exactly one of the callbacks fires, at most once, unless the handle is
    /// destroyed (or dropped) first.
    pub fn start_tracking<S, E>(
        &self,
        order_id: OrderId,
        access_token: impl Into<String>,
        start_with_push: bool,
        polling_deadline_secs: u64,
        on_success: S,
        on_error: E,
    ) -> TrackerHandle
    where
        S: FnOnce(OrderId) + Send + 'static,
        E: FnOnce(TrackingError) + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let params = TrackerParams {
            id,
            order_id,
            access_token: access_token.into(),
            start_with_push,
            polling_deadline: Duration::from_secs(polling_deadline_secs),
            poll_interval: self.poll_interval,
        };

        start_tracker(
            params,
            self.multiplexer.clone(),
            Arc::clone(&self.source),
            Box::new(on_success),
            Box::new(on_error),
        )
    }

    pub fn destroy(&self, handle: &TrackerHandle) {
        handle.destroy();
    }

    /// Track an order and wait for its terminal result
    ///
    /// Dropping the returned future destroys the tracker.
    pub async fn track_until_terminal(
        &self,
        order_id: OrderId,
        access_token: impl Into<String>,
        start_with_push: bool,
        polling_deadline_secs: u64,
    ) -> Result<OrderId, TrackingError> {
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let tx_err = Arc::clone(&tx);

        let _handle = self.start_tracking(
            order_id,
            access_token,
            start_with_push,
            polling_deadline_secs,
            move |id| {
                if let Some(tx) = tx.lock().take() {
                    let _ = tx.send(Ok(id));
                }
            },
            move |error| {
                if let Some(tx) = tx_err.lock().take() {
                    let _ = tx.send(Err(error));
                }
            },
        );

        rx.await.unwrap_or(Err(TrackingError::Aborted))
    }
}
