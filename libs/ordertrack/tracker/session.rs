use super::error::TrackingError;
use super::state::{ErrorCallback, SuccessCallback, TrackerMode, TrackerState};
use crate::domain::{OrderId, OrderStatus};
use crate::multiplexer::{Multiplexer, TrackerEvent, TrackerId, TrackerRegistration};
use crate::poller::OrderStatusSource;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

pub const MIN_POLLING_DEADLINE: Duration = Duration::from_secs(1);
pub const MAX_POLLING_DEADLINE: Duration = Duration::from_secs(3600);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

pub fn clamp_deadline(deadline: Duration) -> Duration {
    deadline.clamp(MIN_POLLING_DEADLINE, MAX_POLLING_DEADLINE)
}

/// Everything needed to start tracking one order
pub struct TrackerParams {
    pub id: TrackerId,
    pub order_id: OrderId,
    pub access_token: String,
    pub start_with_push: bool,
    /// Clamped to 1s..=3600s
    pub polling_deadline: Duration,
    pub poll_interval: Duration,
}

/// Owner's handle to a running tracker
///
/// Dropping the handle destroys the tracker.
pub struct TrackerHandle {
    id: TrackerId,
    order_id: OrderId,
    state: Arc<TrackerState>,
    multiplexer: Multiplexer,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TrackerHandle {
    pub fn id(&self) -> TrackerId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn mode(&self) -> TrackerMode {
        self.state.mode()
    }

    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    /// Stop tracking without firing either callback
    ///
    /// Safe to call in any mode and more than once. Once this returns no
    /// callback of this tracker can start.
    pub fn destroy(&self) {
        let was_running = !self.state.is_completed();
        self.state.cancel();
        self.multiplexer.remove_tracker(self.id);

        if let Some(task) = self.task.lock().take() {
            task.abort();
        }

        if was_running {
            info!("[Tracker] Tracker {} for order {} destroyed", self.id, self.order_id);
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Start a tracker task
///
/// Push registration happens before this returns, so the multiplexer sees
/// the tracker immediately.
pub fn start_tracker(
    params: TrackerParams,
    multiplexer: Multiplexer,
    source: Arc<dyn OrderStatusSource>,
    on_success: SuccessCallback,
    on_error: ErrorCallback,
) -> TrackerHandle {
    let state = Arc::new(TrackerState::new(on_success, on_error));
    let deadline = Instant::now() + clamp_deadline(params.polling_deadline);

    let push_events = if params.start_with_push {
        let (events_tx, events_rx) = unbounded_channel();
        state.enter(TrackerMode::PushTracking);
        multiplexer.add_tracker(TrackerRegistration {
            id: params.id,
            order_id: params.order_id,
            access_token: params.access_token.clone(),
            events: events_tx,
        });
        Some(events_rx)
    } else {
        state.enter(TrackerMode::Polling);
        None
    };

    info!(
        "[Tracker] Tracking order {} ({}), deadline in {:?}",
        params.order_id,
        if params.start_with_push { "push first" } else { "polling" },
        deadline - Instant::now()
    );

    let task = TrackerTask {
        id: params.id,
        order_id: params.order_id,
        access_token: params.access_token,
        poll_interval: params.poll_interval,
        deadline,
        state: Arc::clone(&state),
        multiplexer: multiplexer.clone(),
        source,
    };

    let join = tokio::spawn(task.run(push_events));

    TrackerHandle {
        id: params.id,
        order_id: params.order_id,
        state,
        multiplexer,
        task: Mutex::new(Some(join)),
    }
}

/// How push tracking ended
enum PushOutcome {
    Completed,
    FallBack(String),
}

struct TrackerTask {
    id: TrackerId,
    order_id: OrderId,
    access_token: String,
    poll_interval: Duration,
    deadline: Instant,
    state: Arc<TrackerState>,
    multiplexer: Multiplexer,
    source: Arc<dyn OrderStatusSource>,
}

impl TrackerTask {
    async fn run(self, push_events: Option<UnboundedReceiver<TrackerEvent>>) {
        if let Some(events) = push_events {
            match self.track_push(events).await {
                PushOutcome::Completed => return,
                PushOutcome::FallBack(reason) => {
                    self.multiplexer.remove_tracker(self.id);
                    if !self.state.enter(TrackerMode::Polling) {
                        return;
                    }
                    info!(
                        "[Tracker] Order {}: push tracking stopped ({}), switching to polling",
                        self.order_id, reason
                    );
                }
            }
        }

        self.poll_until_terminal().await;
    }

    async fn track_push(&self, mut events: UnboundedReceiver<TrackerEvent>) -> PushOutcome {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(TrackerEvent::OrderStatusUpdated { status, raw_status, .. }) => {
                        debug!("[Tracker] Order {} pushed status '{}'", self.order_id, raw_status);
                        if status.is_terminal() {
                            self.multiplexer.remove_tracker(self.id);
                            self.finish(status);
                            return PushOutcome::Completed;
                        }
                    }
                    Some(TrackerEvent::ConnectionError(reason)) => {
                        return PushOutcome::FallBack(format!("connection error: {}", reason));
                    }
                    Some(TrackerEvent::ConnectionClosed(reason)) => {
                        return PushOutcome::FallBack(format!("connection closed: {}", reason));
                    }
                    None => return PushOutcome::FallBack("registration dropped".to_string()),
                },
                _ = sleep_until(self.deadline) => {
                    return PushOutcome::FallBack("deadline reached".to_string());
                }
            }
        }
    }

    async fn poll_until_terminal(&self) {
        loop {
            if self.state.is_completed() {
                return;
            }

            let snapshot = match self.source.poll(&self.access_token, self.order_id).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("[Tracker] Order {}: {}", self.order_id, e);
                    self.state.complete_error(TrackingError::Poll(e));
                    return;
                }
            };

            debug!("[Tracker] Order {} polled status '{}'", self.order_id, snapshot.status);
            if snapshot.status.is_terminal() {
                self.finish(snapshot.status);
                return;
            }

            let now = Instant::now();
            if now >= self.deadline {
                warn!("[Tracker] Order {}: polling deadline reached", self.order_id);
                self.state.complete_error(TrackingError::Expired);
                return;
            }

            sleep(self.poll_interval.min(self.deadline - now)).await;
        }
    }

    fn finish(&self, status: OrderStatus) {
        match status {
            OrderStatus::Done => {
                info!("[Tracker] Order {} is done", self.order_id);
                self.state.complete_success(self.order_id);
            }
            OrderStatus::Canceled => {
                info!("[Tracker] Order {} was canceled", self.order_id);
                self.state.complete_error(TrackingError::Canceled);
            }
            other => debug!("[Tracker] Ignoring non-terminal status {}", other),
        }
    }
}
