//! Millisecond-resolution interval timer: the same shape as every `m_*Timeout`/
//! `m_*Hang`/`m_*Watchdog` field on the per-protocol site controller. Started
//! explicitly, advanced by an external clock tick (the host's 1 ms tick thread, per
//! spec's concurrency model), and polled for expiry rather than scheduled on its own
//! thread.

use std::time::Duration;

/// A stop/start/clock/expiry timer over an externally-driven clock.
#[derive(Clone, Copy, Debug)]
pub struct Timer {
    timeout: Duration,
    elapsed: Duration,
    running: bool,
}

impl Timer {
    /// Create a stopped timer with the given timeout.
    pub fn new(timeout: Duration) -> Timer {
        Timer { timeout, elapsed: Duration::ZERO, running: false }
    }

    /// Create a stopped timer with a timeout given in whole seconds.
    pub fn from_secs(secs: u64) -> Timer {
        Timer::new(Duration::from_secs(secs))
    }

    /// Start (or restart) the timer from zero elapsed time.
    pub fn start(&mut self) {
        self.running = true;
        self.elapsed = Duration::ZERO;
    }

    /// Stop the timer and reset its elapsed time.
    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance the timer by `delta` if running; a no-op otherwise.
    pub fn clock(&mut self, delta: Duration) {
        if self.running {
            self.elapsed += delta;
        }
    }

    /// Whether the timer is running and has reached its timeout.
    pub fn has_expired(&self) -> bool {
        self.running && self.elapsed >= self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
