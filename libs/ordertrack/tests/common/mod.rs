//! Common test utilities for order tracker integration tests
//!
//! Provides an in-memory transport factory the tests can drive by hand, a
//! scripted status source and a recorder for tracker callbacks.

#![allow(dead_code)]

use async_trait::async_trait;
use ordertrack::multiplexer::MultiplexerConfig;
use ordertrack::{
    Multiplexer, OrderId, OrderSnapshot, OrderStatus, OrderStatusSource, PollError,
    TrackingContext, TrackingError,
};
use parking_lot::Mutex;
use pushsockets::{EventSender, Transport, TransportEvent, TransportFactory};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

pub const PROJECT_ID: u64 = 77;
pub const TOKEN: &str = "test-token";

/// Let spawned tasks drain their queues
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Mock transport
// ============================================================================

pub struct MockTransport {
    events: Mutex<Option<EventSender>>,
    connected: AtomicBool,
    closed: AtomicBool,
    auto_connect: bool,
    sent: Mutex<Vec<String>>,
    live: Arc<AtomicUsize>,
}

impl MockTransport {
    fn emit(&self, event: TransportEvent) {
        if let Some(tx) = self.events.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    /// Frames the multiplexer sent, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn deliver(&self, raw: &str) {
        self.emit(TransportEvent::Message(raw.to_string()));
    }

    pub fn push_status(&self, order_id: OrderId, status: &str) {
        self.deliver(&format!(
            r#"{{"push":{{"pub":{{"data":{{"order_id":{},"status":"{}"}},"offset":1}},"channel":"orders"}}}}"#,
            order_id, status
        ));
    }

    pub fn server_close(&self, code: u16, reason: &str) {
        self.connected.store(false, Ordering::SeqCst);
        self.emit(TransportEvent::Closed {
            code,
            reason: reason.to_string(),
            clean: true,
        });
    }

    pub fn fail(&self, reason: &str) {
        self.emit(TransportEvent::Error(reason.to_string()));
    }
}

impl Transport for MockTransport {
    fn connect(&self) {
        if self.auto_connect {
            self.connected.store(true, Ordering::SeqCst);
            self.emit(TransportEvent::Connected);
        }
    }

    fn send(&self, payload: String) {
        if self.is_connected() {
            self.sent.lock().push(payload);
        } else {
            self.fail("Can't send frame: not connected");
        }
    }

    fn close(&self) {
        self.events.lock().take();
        self.connected.store(false, Ordering::SeqCst);
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Hands out [`MockTransport`]s and keeps them reachable for the test
#[derive(Clone)]
pub struct MockTransportFactory {
    created: Arc<Mutex<Vec<Arc<MockTransport>>>>,
    live: Arc<AtomicUsize>,
    auto_connect: bool,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self {
            created: Arc::new(Mutex::new(Vec::new())),
            live: Arc::new(AtomicUsize::new(0)),
            auto_connect: true,
        }
    }

    /// Transports that never finish connecting
    pub fn never_connecting() -> Self {
        Self {
            auto_connect: false,
            ..Self::new()
        }
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }

    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Arc<MockTransport> {
        self.created
            .lock()
            .last()
            .cloned()
            .expect("no transport created yet")
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(&self, events: EventSender) -> Arc<dyn Transport> {
        let transport = Arc::new(MockTransport {
            events: Mutex::new(Some(events)),
            connected: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            auto_connect: self.auto_connect,
            sent: Mutex::new(Vec::new()),
            live: Arc::clone(&self.live),
        });
        self.live.fetch_add(1, Ordering::SeqCst);
        self.created.lock().push(Arc::clone(&transport));
        transport
    }
}

// ============================================================================
// Scripted status source
// ============================================================================

/// Replays queued responses; the last one repeats forever
pub struct ScriptedPoller {
    script: Mutex<VecDeque<Result<OrderStatus, PollError>>>,
    fallback: Mutex<Result<OrderStatus, PollError>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedPoller {
    pub fn always(status: OrderStatus) -> Arc<Self> {
        Self::script(vec![Ok(status)])
    }

    pub fn script(responses: Vec<Result<OrderStatus, PollError>>) -> Arc<Self> {
        let fallback = responses.last().cloned().unwrap_or(Ok(OrderStatus::New));
        Arc::new(Self {
            script: Mutex::new(responses.into()),
            fallback: Mutex::new(fallback),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl OrderStatusSource for ScriptedPoller {
    async fn poll(&self, access_token: &str, order_id: OrderId) -> Result<OrderSnapshot, PollError> {
        assert_eq!(access_token, TOKEN);
        self.calls.lock().push(Instant::now());

        let next = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.lock().clone());

        next.map(|status| OrderSnapshot {
            order_id,
            status,
            content: serde_json::json!({ "order_id": order_id, "status": status.as_str() }),
        })
    }
}

// ============================================================================
// Callback recorder
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(OrderId),
    Error(TrackingError),
}

#[derive(Clone, Default)]
pub struct Outcomes {
    seen: Arc<Mutex<Vec<Outcome>>>,
}

impl Outcomes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(&self) -> impl FnOnce(OrderId) + Send + 'static {
        let seen = Arc::clone(&self.seen);
        move |id| seen.lock().push(Outcome::Success(id))
    }

    pub fn on_error(&self) -> impl FnOnce(TrackingError) + Send + 'static {
        let seen = Arc::clone(&self.seen);
        move |error| seen.lock().push(Outcome::Error(error))
    }

    pub fn all(&self) -> Vec<Outcome> {
        self.seen.lock().clone()
    }
}

// ============================================================================
// Context builders
// ============================================================================

pub fn multiplexer_config() -> MultiplexerConfig {
    MultiplexerConfig::new(PROJECT_ID)
}

pub fn context_with(
    factory: &MockTransportFactory,
    poller: Arc<ScriptedPoller>,
    config: MultiplexerConfig,
) -> TrackingContext {
    let multiplexer = Multiplexer::new(config, Arc::new(factory.clone()));
    TrackingContext::new(multiplexer, poller).with_poll_interval(Duration::from_secs(3))
}

pub fn context(factory: &MockTransportFactory, poller: Arc<ScriptedPoller>) -> TrackingContext {
    context_with(factory, poller, multiplexer_config())
}
