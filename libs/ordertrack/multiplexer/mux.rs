use super::codec::{decode_frame, DecodedFrame};
use super::events::{
    MultiplexerConfig, TrackerEvent, TrackerId, TrackerRegistration, NETWORK_PROBLEMS,
};
use super::liveness::LivenessCounter;
use crate::domain::ConnectionHandshake;
use parking_lot::Mutex;
use pushsockets::{Transport, TransportEvent, TransportFactory};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Application-level ping frame
const PING_FRAME: &str = "{}";

/// Shares one push connection between any number of order trackers
///
/// The connection exists exactly while at least one tracker is registered:
/// the first `add_tracker` creates and connects a transport, the last
/// `remove_tracker` closes it. Cloning is cheap and every clone refers to the
/// same registry.
///
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct Multiplexer {
    inner: Arc<Inner>,
}

struct Inner {
    config: MultiplexerConfig,
    factory: Arc<dyn TransportFactory>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    trackers: HashMap<TrackerId, TrackerRegistration>,
    connection: Option<Connection>,
    generation: u64,
}

/// One physical connection and the tasks serving it
struct Connection {
    generation: u64,
    transport: Arc<dyn Transport>,
    auth_token: String,
    liveness: LivenessCounter,
    pump: Option<JoinHandle<()>>,
    heartbeat: Option<JoinHandle<()>>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(handle) = self.heartbeat.take() {
            handle.abort();
        }
        if let Some(handle) = self.pump.take() {
            handle.abort();
        }
        self.transport.close();
    }
}

impl Multiplexer {
    pub fn new(config: MultiplexerConfig, factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                factory,
                state: Mutex::new(State::default()),
            }),
        }
    }

    pub fn config(&self) -> &MultiplexerConfig {
        &self.inner.config
    }

    /// Register a tracker; opens the connection if it is the first one
    ///
    /// Registering an id that is already present does nothing.
    pub fn add_tracker(&self, registration: TrackerRegistration) {
        let mut state = self.inner.state.lock();

        if state.trackers.contains_key(&registration.id) {
            debug!("[Multiplexer] Tracker {} already registered", registration.id);
            return;
        }

        debug!(
            "[Multiplexer] Registering tracker {} for order {}",
            registration.id, registration.order_id
        );
        let auth_token = registration.access_token.clone();
        state.trackers.insert(registration.id, registration);

        if state.connection.is_none() {
            state.generation += 1;
            let generation = state.generation;
            state.connection = Some(self.open_connection(generation, auth_token));
        }
    }

    /// Unregister a tracker; closes the connection once none remain
    ///
    /// Unknown ids are ignored.
    pub fn remove_tracker(&self, id: TrackerId) {
        let released = {
            let mut state = self.inner.state.lock();
            if state.trackers.remove(&id).is_none() {
                return;
            }
            debug!("[Multiplexer] Unregistered tracker {}", id);

            if state.trackers.is_empty() {
                state.connection.take()
            } else {
                None
            }
        };

        if let Some(connection) = released {
            info!(
                "[Multiplexer] No trackers left, closing connection #{}",
                connection.generation
            );
            drop(connection);
        }
    }

    pub fn tracker_count(&self) -> usize {
        self.inner.state.lock().trackers.len()
    }

    pub fn is_registered(&self, id: TrackerId) -> bool {
        self.inner.state.lock().trackers.contains_key(&id)
    }

    /// Whether a transport currently exists (connected or not)
    pub fn has_transport(&self) -> bool {
        self.inner.state.lock().connection.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.inner
            .state
            .lock()
            .connection
            .as_ref()
            .map_or(false, |c| c.transport.is_connected())
    }

    fn open_connection(&self, generation: u64, auth_token: String) -> Connection {
        let (events_tx, events_rx) = unbounded_channel();
        let transport = self.inner.factory.create(events_tx);

        let config = &self.inner.config;
        let mut connection = Connection {
            generation,
            transport: Arc::clone(&transport),
            auth_token,
            liveness: LivenessCounter::new(config.ping_threshold, config.timeout_limit),
            pump: None,
            heartbeat: None,
        };

        let weak = Arc::downgrade(&self.inner);
        connection.pump = Some(tokio::spawn(pump_events(
            Weak::clone(&weak),
            generation,
            events_rx,
        )));

        info!("[Multiplexer] Opening connection #{}", generation);
        transport.connect();

        connection.heartbeat = Some(tokio::spawn(run_heartbeat(weak, generation)));
        connection
    }
}

/// Forward transport events into the registry until the transport goes away
async fn pump_events(
    inner: Weak<Inner>,
    generation: u64,
    mut events: UnboundedReceiver<TransportEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.handle_transport_event(generation, event);
    }
    debug!("[Multiplexer] Event pump for connection #{} finished", generation);
}

async fn run_heartbeat(inner: Weak<Inner>, generation: u64) {
    let period = match inner.upgrade() {
        Some(inner) => inner.config.heartbeat_interval,
        None => return,
    };

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        if inner.on_heartbeat(generation) {
            break;
        }
    }
}

impl Inner {
    fn handle_transport_event(&self, generation: u64, event: TransportEvent) {
        let mut guard = self.state.lock();
        let State {
            trackers,
            connection,
            ..
        } = &mut *guard;

        let Some(connection) = connection.as_mut().filter(|c| c.generation == generation) else {
            debug!("[Multiplexer] Dropping event from stale connection #{}", generation);
            return;
        };

        match event {
            TransportEvent::Connected => {
                info!("[Multiplexer] Connection #{} established", generation);
                let handshake =
                    ConnectionHandshake::with_random_id(connection.auth_token.as_str(), self.config.project_id);
                match handshake.to_json() {
                    Ok(frame) => connection.transport.send(frame),
                    Err(e) => warn!("[Multiplexer] Failed to encode handshake: {}", e),
                }
            }
            TransportEvent::Message(raw) => {
                connection.liveness.on_message();
                match decode_frame(&raw) {
                    Ok(DecodedFrame::Push(envelope)) => {
                        debug!(
                            "[Multiplexer] Order {} status '{}' on channel {}",
                            envelope.order_id, envelope.raw_status, envelope.channel
                        );
                        let status = envelope.status();
                        for registration in trackers.values().filter(|r| r.order_id == envelope.order_id) {
                            let _ = registration.events.send(TrackerEvent::OrderStatusUpdated {
                                order_id: envelope.order_id,
                                status,
                                raw_status: envelope.raw_status.clone(),
                            });
                        }
                    }
                    Ok(DecodedFrame::ConnectAck) => {
                        info!("[Multiplexer] Connect acknowledged by server");
                    }
                    Ok(DecodedFrame::Unrecognized) => {
                        warn!("[Multiplexer] Unrecognized frame dropped: {}", raw);
                    }
                    Err(e) => {
                        warn!("[Multiplexer] {} ({})", e, raw);
                    }
                }
            }
            TransportEvent::Error(reason) => {
                warn!("[Multiplexer] Transport error: {}", reason);
                broadcast(trackers, TrackerEvent::ConnectionError(reason));
            }
            TransportEvent::Closed {
                code,
                reason,
                clean,
            } => {
                info!(
                    "[Multiplexer] Connection #{} closed (code {}, clean {}): {}",
                    generation, code, clean, reason
                );
                broadcast(
                    trackers,
                    TrackerEvent::ConnectionClosed(format!("code {}: {}", code, reason)),
                );
            }
        }
    }

    /// Returns true once the heartbeat should stop
    fn on_heartbeat(&self, generation: u64) -> bool {
        let mut guard = self.state.lock();
        let State {
            trackers,
            connection,
            ..
        } = &mut *guard;

        let Some(connection) = connection.as_mut().filter(|c| c.generation == generation) else {
            return true;
        };

        let connected = connection.transport.is_connected();
        let outcome = connection
            .liveness
            .on_tick(connected, self.config.heartbeat_interval);

        if outcome.ping {
            debug!("[Multiplexer] Sending ping");
            connection.transport.send(PING_FRAME.to_string());
        }

        if outcome.expired {
            warn!(
                "[Multiplexer] No connection for {:?}, giving up",
                connection.liveness.missed()
            );
            broadcast(trackers, TrackerEvent::ConnectionClosed(NETWORK_PROBLEMS.to_string()));
            return true;
        }

        false
    }
}

fn broadcast(trackers: &HashMap<TrackerId, TrackerRegistration>, event: TrackerEvent) {
    for registration in trackers.values() {
        let _ = registration.events.send(event.clone());
    }
}
