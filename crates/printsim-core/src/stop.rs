//! Stop coordination (spec.md §4.7). A run ends either because every job
//! that will ever arrive has been served, or because something external
//! (an OS signal, or a websocket `stop` command) asked it to end early.
//! Either path funnels through the same `simulation_state_lock`-guarded
//! flags so workers only ever need to check one place.

use std::sync::{Condvar, Mutex};

#[derive(Debug, Default)]
struct State {
    stop_requested: bool,
    all_jobs_arrived: bool,
    all_jobs_served: bool,
}

/// Shared termination state. Cloned via `Arc` into every worker thread;
/// `simulation_state_lock` (the inner `Mutex`) is always acquired alone —
/// never nested inside `job_queue_lock` or `refill_queue_lock`.
#[derive(Debug, Default)]
pub struct StopHandle {
    state: Mutex<State>,
    changed: Condvar,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests external termination (signal or websocket `stop` command).
    /// Idempotent: a second call is a no-op.
    pub fn request_stop(&self) {
        let mut state = self.state.lock().expect("simulation_state_lock poisoned");
        state.stop_requested = true;
        self.changed.notify_all();
    }

    pub fn mark_all_jobs_arrived(&self) {
        let mut state = self.state.lock().expect("simulation_state_lock poisoned");
        state.all_jobs_arrived = true;
        self.changed.notify_all();
    }

    pub fn mark_all_jobs_served(&self) {
        let mut state = self.state.lock().expect("simulation_state_lock poisoned");
        state.all_jobs_served = true;
        self.changed.notify_all();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state.lock().expect("simulation_state_lock poisoned").stop_requested
    }

    pub fn all_jobs_arrived(&self) -> bool {
        self.state.lock().expect("simulation_state_lock poisoned").all_jobs_arrived
    }

    /// True once every generated job has reached a terminal state (served,
    /// dropped, or removed) — the natural end of a run with no external
    /// stop. Workers blocked on an empty queue use this (plus
    /// `is_stop_requested`) to decide whether to keep waiting or exit.
    pub fn is_run_complete(&self) -> bool {
        let state = self.state.lock().expect("simulation_state_lock poisoned");
        state.stop_requested || (state.all_jobs_arrived && state.all_jobs_served)
    }

    /// Blocks until either the run completes or is stopped externally.
    /// Used by threads that have nothing left to do but wait for the run to
    /// wind down (e.g. the refiller once the queue is permanently empty).
    pub fn wait_for_completion(&self) {
        let mut state = self.state.lock().expect("simulation_state_lock poisoned");
        while !(state.stop_requested || (state.all_jobs_arrived && state.all_jobs_served)) {
            state = self.changed.wait(state).expect("simulation_state_lock poisoned");
        }
    }

    pub fn notify_all(&self) {
        let _unused = self.state.lock().expect("simulation_state_lock poisoned");
        self.changed.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn request_stop_completes_run_immediately() {
        let handle = StopHandle::new();
        assert!(!handle.is_run_complete());
        handle.request_stop();
        assert!(handle.is_run_complete());
    }

    #[test]
    fn natural_completion_requires_both_flags() {
        let handle = StopHandle::new();
        handle.mark_all_jobs_arrived();
        assert!(!handle.is_run_complete());
        handle.mark_all_jobs_served();
        assert!(handle.is_run_complete());
    }

    #[test]
    fn wait_for_completion_wakes_on_stop() {
        let handle = Arc::new(StopHandle::new());
        let waiter = Arc::clone(&handle);
        let join = thread::spawn(move || waiter.wait_for_completion());
        thread::sleep(Duration::from_millis(20));
        handle.request_stop();
        join.join().expect("waiter thread panicked");
    }
}
