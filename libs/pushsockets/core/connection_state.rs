//! Lock-free connection state

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a single transport connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    ShuttingDown = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::ShuttingDown,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Connection state shared between the transport handle and its I/O task
pub struct AtomicConnectionState {
    state: AtomicU8,
}

impl AtomicConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self {
            state: AtomicU8::new(state as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Move to `next` unless the transport is already shutting down
    ///
    /// Returns false if shutdown won the race.
    pub fn transition_unless_shutting_down(&self, next: ConnectionState) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current == ConnectionState::ShuttingDown as u8 {
                return false;
            }
            match self.state.compare_exchange_weak(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }

    #[inline]
    pub fn is_connecting(&self) -> bool {
        self.get() == ConnectionState::Connecting
    }

    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.get() == ConnectionState::Disconnected
    }

    #[inline]
    pub fn is_shutting_down(&self) -> bool {
        self.get() == ConnectionState::ShuttingDown
    }
}
