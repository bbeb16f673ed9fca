//! Graceful shutdown management

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Notify;
use tracing::info;

/// Tracks whether the process was asked to stop
#[derive(Clone)]
pub struct ShutdownManager {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownManager {
    /// Create a new shutdown manager with running state
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(true)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Spawn a Ctrl+C signal handler that triggers shutdown
    pub fn spawn_signal_handler(&self) {
        let manager = self.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("");
                info!("Received shutdown signal (Ctrl+C)");
                info!("Shutting down gracefully...");
                manager.trigger();
            }
        });
    }

    pub fn trigger(&self) {
        self.flag.store(false, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Check if the process should continue running
    pub fn is_running(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Resolve once shutdown has been triggered
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if !self.is_running() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
