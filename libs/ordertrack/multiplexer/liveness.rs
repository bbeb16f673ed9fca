//! Heartbeat bookkeeping for the shared connection

use std::time::Duration;

/// Outcome of one heartbeat tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Send an application ping now
    pub ping: bool,
    /// The connection has been down for the whole timeout window
    pub expired: bool,
}

/// Beat counter plus missed-time accumulator
#[derive(Debug, Clone)]
pub struct LivenessCounter {
    beats: u32,
    ping_threshold: u32,
    missed: Duration,
    timeout_limit: Duration,
}

impl LivenessCounter {
    pub fn new(ping_threshold: u32, timeout_limit: Duration) -> Self {
        Self {
            beats: 0,
            ping_threshold: ping_threshold.max(1),
            missed: Duration::ZERO,
            timeout_limit,
        }
    }

    /// Advance by one heartbeat tick of length `tick`
    pub fn on_tick(&mut self, connected: bool, tick: Duration) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        self.beats += 1;
        if self.beats >= self.ping_threshold {
            self.beats = 0;
            outcome.ping = connected;
        }

        if connected {
            self.missed = Duration::ZERO;
        } else {
            self.missed += tick;
        }

        outcome.expired = self.missed >= self.timeout_limit;
        outcome
    }

    /// Inbound traffic proves the peer is alive
    pub fn on_message(&mut self) {
        self.beats = 0;
    }

    pub fn beats(&self) -> u32 {
        self.beats
    }

    pub fn missed(&self) -> Duration {
        self.missed
    }
}
