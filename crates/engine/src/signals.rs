//! Cancellation for one match.
//!
//! Three flags stop the per-player threads:
//!
//! - `shutdown`: the whole program is exiting (shared across matches)
//! - `return_to_menu`: a player pressed the quit key
//! - `finished`: the coordinator left the match loop for any other reason
//!
//! Threads check [`MatchSignals::should_stop`] at the top of every loop and
//! after every blocking call. Sleeping goes through [`MatchSignals::sleep`],
//! which a cancellation wakes immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug)]
pub struct MatchSignals {
    shutdown: Arc<AtomicBool>,
    return_to_menu: AtomicBool,
    finished: AtomicBool,
    gate: Mutex<()>,
    wake: Condvar,
}

impl MatchSignals {
    /// Fresh signals for a new match. `return_to_menu` starts cleared.
    pub fn new(shutdown: Arc<AtomicBool>) -> Self {
        Self {
            shutdown,
            return_to_menu: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            gate: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn return_to_menu_requested(&self) -> bool {
        self.return_to_menu.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn should_stop(&self) -> bool {
        self.shutdown_requested() || self.return_to_menu_requested() || self.is_finished()
    }

    pub fn request_shutdown(&self) {
        self.raise(&self.shutdown);
    }

    pub fn request_return_to_menu(&self) {
        self.raise(&self.return_to_menu);
    }

    /// Stop every thread of this match.
    pub fn finish(&self) {
        self.raise(&self.finished);
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns true if the full duration elapsed and the caller should
    /// carry on, false if the match is stopping.
    pub fn sleep(&self, duration: Duration) -> bool {
        let guard = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = self
            .wake
            .wait_timeout_while(guard, duration, |_| !self.should_stop())
            .unwrap_or_else(PoisonError::into_inner);
        !self.should_stop()
    }

    fn raise(&self, flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
        // Taking the gate orders the store before any sleeper's re-check.
        let _guard = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        self.wake.notify_all();
    }
}
