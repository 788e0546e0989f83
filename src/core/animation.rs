//! Cancellable periodic tick source for timeline playback.
//!
//! Wraps `crossbeam_channel::tick`. The receiver is the tick source: while
//! it exists ticks are delivered, dropping it cancels them. At most one
//! receiver is held, so restarting a running animation cannot double the
//! playback rate.

use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use log::trace;

/// Default time between two animation steps
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug)]
pub struct Animation {
    interval: Duration,
    ticks: Option<Receiver<Instant>>,
    /// Number of tick sources created so far
    starts: u64,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Animation {
    /// Create a stopped animation. Zero intervals are raised to 1 ms.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            ticks: None,
            starts: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking. No-op while already running.
    pub fn start(&mut self) {
        if self.ticks.is_some() {
            return;
        }
        self.ticks = Some(crossbeam_channel::tick(self.interval));
        self.starts += 1;
        trace!("Animation ticker started ({} ms)", self.interval.as_millis());
    }

    /// Cancel the tick source. No-op while stopped.
    pub fn stop(&mut self) {
        if self.ticks.take().is_some() {
            trace!("Animation ticker cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticks.is_some()
    }

    pub fn starts(&self) -> u64 {
        self.starts
    }

    /// Receiver to select on; never fires while stopped.
    pub fn receiver(&self) -> Receiver<Instant> {
        match &self.ticks {
            Some(rx) => rx.clone(),
            None => crossbeam_channel::never(),
        }
    }
}
