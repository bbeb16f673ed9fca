//! Tracker mode and the single-fire completion latch

use super::error::TrackingError;
use crate::domain::OrderId;
use parking_lot::Mutex;

pub type SuccessCallback = Box<dyn FnOnce(OrderId) + Send + 'static>;
pub type ErrorCallback = Box<dyn FnOnce(TrackingError) + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerMode {
    Init,
    PushTracking,
    Polling,
    Completed,
}

/// Holds both callbacks until exactly one of them is taken
pub struct CompletionLatch {
    callbacks: Mutex<Option<(SuccessCallback, ErrorCallback)>>,
}

impl CompletionLatch {
    pub fn new(on_success: SuccessCallback, on_error: ErrorCallback) -> Self {
        Self {
            callbacks: Mutex::new(Some((on_success, on_error))),
        }
    }

    /// Returns false if the latch had already fired or been disarmed
    pub fn fire_success(&self, order_id: OrderId) -> bool {
        // Callback runs outside the lock
        let taken = self.callbacks.lock().take();
        match taken {
            Some((on_success, _)) => {
                on_success(order_id);
                true
            }
            None => false,
        }
    }

    pub fn fire_error(&self, error: TrackingError) -> bool {
        let taken = self.callbacks.lock().take();
        match taken {
            Some((_, on_error)) => {
                on_error(error);
                true
            }
            None => false,
        }
    }

    /// Drop both callbacks without calling either
    pub fn disarm(&self) {
        self.callbacks.lock().take();
    }

    pub fn is_spent(&self) -> bool {
        self.callbacks.lock().is_none()
    }
}

/// State shared between a tracker's task and its handle
pub struct TrackerState {
    mode: Mutex<TrackerMode>,
    latch: CompletionLatch,
}

impl TrackerState {
    pub fn new(on_success: SuccessCallback, on_error: ErrorCallback) -> Self {
        Self {
            mode: Mutex::new(TrackerMode::Init),
            latch: CompletionLatch::new(on_success, on_error),
        }
    }

    pub fn mode(&self) -> TrackerMode {
        *self.mode.lock()
    }

    /// Move to `next` unless already completed; returns whether it moved
    pub fn enter(&self, next: TrackerMode) -> bool {
        let mut mode = self.mode.lock();
        if *mode == TrackerMode::Completed {
            return false;
        }
        *mode = next;
        true
    }

    pub fn is_completed(&self) -> bool {
        self.mode() == TrackerMode::Completed
    }

    pub fn complete_success(&self, order_id: OrderId) -> bool {
        if !self.enter(TrackerMode::Completed) {
            return false;
        }
        self.latch.fire_success(order_id)
    }

    pub fn complete_error(&self, error: TrackingError) -> bool {
        if !self.enter(TrackerMode::Completed) {
            return false;
        }
        self.latch.fire_error(error)
    }

    /// Complete without any callback
    pub fn cancel(&self) {
        self.latch.disarm();
        *self.mode.lock() = TrackerMode::Completed;
    }
}
