//! Shared state and the four worker threads that make up a run (spec.md
//! §4.4-§4.6): the job generator, the two printers, and the refiller.
//!
//! Lock ordering (spec.md §5): `job_queue_lock → stats_lock`,
//! `refill_queue_lock → stats_lock`, `simulation_state_lock` always alone. A
//! printer never holds `job_queue_lock` and `refill_queue_lock` at once —
//! every printer releases the job queue lock before it ever touches the
//! refill queue.

pub mod generator;
pub mod printer;
pub mod refiller;

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::clock::RunClock;
use crate::config::SimulationParameters;
use crate::domain::Job;
use crate::queue::TimedQueue;
use crate::sink::EventRouter;
use crate::stop::StopHandle;

/// Paper-count state for both printers. Deliberately *not* split per-printer
/// behind independent locks: the refiller and a printer's post-service
/// decrement both mutate the same array, so one lock has to own it (see
/// DESIGN.md, "paper count ownership").
pub struct RefillState {
    pub paper_counts: [u64; 2],
    pub pending: VecDeque<usize>,
}

impl RefillState {
    fn new(capacity: u64) -> Self {
        Self {
            paper_counts: [capacity, capacity],
            pending: VecDeque::new(),
        }
    }
}

/// Everything the four worker threads need, shared behind an `Arc`.
pub struct SharedState {
    pub params: SimulationParameters,
    pub clock: RunClock,
    pub stop: StopHandle,
    pub router: EventRouter,

    pub job_queue: Mutex<TimedQueue<Job>>,
    pub job_queue_cv: Condvar,

    pub refill: Mutex<RefillState>,
    pub refill_cv: Condvar,
}

impl SharedState {
    pub fn new(params: SimulationParameters, router: EventRouter) -> Self {
        let capacity = params.printer_paper_capacity;
        Self {
            job_queue: Mutex::new(TimedQueue::new(Some(params.queue_capacity))),
            refill: Mutex::new(RefillState::new(capacity)),
            params,
            clock: RunClock::new(),
            stop: StopHandle::new(),
            router,
            job_queue_cv: Condvar::new(),
            refill_cv: Condvar::new(),
        }
    }

    /// Wakes every worker blocked on either condvar. Called whenever
    /// `StopHandle` state changes, since `job_queue_cv`/`refill_cv` waiters
    /// don't otherwise learn about it.
    pub fn wake_all_workers(&self) {
        self.job_queue_cv.notify_all();
        self.refill_cv.notify_all();
    }

    /// Flips the stop flag, drains whatever is left in the job queue with a
    /// `removed_job` event per job (spec.md §4.7), and wakes every worker.
    /// Idempotent: draining an already-empty queue emits nothing.
    pub fn request_stop_and_drain(&self) {
        self.stop.request_stop();
        let now = self.now_relative();
        self.log_lock("job_queue_lock", "acquiring");
        let drained = {
            let mut queue = self.job_queue.lock().expect("job_queue_lock poisoned");
            queue.clear(crate::clock::now_us())
        };
        self.log_lock("job_queue_lock", "releasing");
        for job in drained {
            self.router.removed_job(now, job.id);
        }
        self.wake_all_workers();
    }

    /// Re-checks whether the run has reached its natural end (every arrived
    /// job accounted for) and, if so, flips `all_jobs_served` and wakes
    /// everyone. Cheap enough to call after every job reaches a terminal
    /// state.
    pub fn check_natural_completion(&self) {
        if !self.stop.all_jobs_arrived() {
            return;
        }
        let report = self.router.stats_snapshot(self.now_relative());
        let accounted = report.jobs_served + report.jobs_dropped + report.jobs_removed;
        if accounted >= report.jobs_arrived {
            self.stop.mark_all_jobs_served();
            self.wake_all_workers();
        }
    }

    pub fn now_relative(&self) -> u64 {
        self.clock.relative(crate::clock::now_us())
    }

    /// Logs a lock acquisition/release at `tracing::debug!` when `--debug`
    /// is set. Diagnostic only — never reaches a sink backend, so it never
    /// appears in JSON frames or terminal trace output. Locks here are held
    /// across condvar waits, which rules out a guard wrapper that logs on
    /// `Drop` (the condvar needs the real `MutexGuard`), so call sites log
    /// explicitly around their `lock()`/`drop()` calls instead.
    pub fn log_lock(&self, name: &str, action: &str) {
        if self.params.debug {
            tracing::debug!("{action} {name}");
        }
    }
}
