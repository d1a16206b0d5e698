//! External start/stop gate for the autonomous routine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// The competition runtime's run gate.
///
/// Before start: `is_active() == false`.  While running: `true`.  After a
/// stop request: `false` again, and [`stop_requested`][Self::stop_requested]
/// reports `true`.
pub trait RunSignal: Send {
    /// `true` while the routine should keep executing.
    fn is_active(&self) -> bool;

    /// `true` once a stop has been requested, even if the routine was never
    /// started.
    fn stop_requested(&self) -> bool {
        false
    }
}

/// Cloneable atomic run gate.
///
/// One clone lives inside the sequencer, others are handed to whatever
/// flips the gate (a Ctrl-C handler, a field-control bridge, a test).
#[derive(Clone, Default)]
pub struct SharedRunSignal {
    started: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    started_at: Arc<Mutex<Option<Instant>>>,
}

impl SharedRunSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate.  Calling `start` again does not reset the start time.
    pub fn start(&self) {
        let mut started_at = self
            .started_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if started_at.is_none() {
            *started_at = Some(Instant::now());
        }
        self.started.store(true, Ordering::SeqCst);
    }

    /// Close the gate permanently.
    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Time since [`start`][Self::start] was first called.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .map(|t| t.elapsed())
    }
}

impl RunSignal for SharedRunSignal {
    fn is_active(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.stopped.load(Ordering::SeqCst)
    }

    fn stop_requested(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// A [`SharedRunSignal`] that also closes once a fixed period has elapsed
/// since start, the way a match timer ends the autonomous window.
#[derive(Clone)]
pub struct TimedRunSignal {
    signal: SharedRunSignal,
    period: Duration,
}

impl TimedRunSignal {
    pub fn new(signal: SharedRunSignal, period: Duration) -> Self {
        Self { signal, period }
    }

    fn expired(&self) -> bool {
        self.signal.elapsed().is_some_and(|e| e >= self.period)
    }
}

impl RunSignal for TimedRunSignal {
    fn is_active(&self) -> bool {
        self.signal.is_active() && !self.expired()
    }

    fn stop_requested(&self) -> bool {
        self.signal.stop_requested() || self.expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn shared_signal_lifecycle() {
        let signal = SharedRunSignal::new();
        assert!(!signal.is_active());
        assert!(!signal.stop_requested());
        assert!(signal.elapsed().is_none());

        signal.start();
        assert!(signal.is_active());
        assert!(signal.elapsed().is_some());

        signal.request_stop();
        assert!(!signal.is_active());
        assert!(signal.stop_requested());
    }

    #[test]
    fn clones_share_state() {
        let signal = SharedRunSignal::new();
        let remote = signal.clone();
        remote.start();
        assert!(signal.is_active());
        remote.request_stop();
        assert!(!signal.is_active());
    }

    #[test]
    fn stop_before_start_is_reported() {
        let signal = SharedRunSignal::new();
        signal.request_stop();
        assert!(signal.stop_requested());
        signal.start();
        assert!(!signal.is_active());
    }

    #[test]
    fn timed_signal_closes_after_period() {
        let signal = SharedRunSignal::new();
        let timed = TimedRunSignal::new(signal.clone(), Duration::from_millis(20));
        assert!(!timed.is_active());
        assert!(!timed.stop_requested());

        signal.start();
        assert!(timed.is_active());

        thread::sleep(Duration::from_millis(30));
        assert!(!timed.is_active());
        assert!(timed.stop_requested());
    }
}
