//! Wires the four worker threads together into one run (spec.md §4,
//! concurrency model in §5): spawns the generator, the two printers, and
//! the refiller, then waits for all of them to finish.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::clock::now_us;
use crate::config::SimulationParameters;
use crate::sink::{EventRouter, StopReason};
use crate::stats::StatsReport;
use crate::workers::{generator, printer, refiller, SharedState};

/// A run in progress. Drop this (or call `join`) to reclaim the worker
/// threads; call `request_stop` at any point to end the run early.
pub struct RunHandle {
    shared: Arc<SharedState>,
    workers: Vec<JoinHandle<()>>,
}

impl RunHandle {
    /// Requests the run end immediately, draining in-flight jobs but taking
    /// no new ones (spec.md §4.7). Safe to call from any thread, any number
    /// of times.
    pub fn request_stop(&self) {
        self.shared.request_stop_and_drain();
    }

    pub fn stats_snapshot(&self) -> StatsReport {
        self.shared.router.stats_snapshot(self.shared.now_relative())
    }

    /// A cheap, cloneable capability to stop this run from another thread
    /// (e.g. a signal handler or a websocket `stop` command) without giving
    /// that thread ownership of the `RunHandle` itself.
    pub fn stopper(&self) -> RunStopper {
        RunStopper {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Blocks until every worker thread has exited, then reports final
    /// statistics and emits the terminal trace/event.
    pub fn join(mut self) -> RunOutcome {
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }

        let stopped_early = self.shared.stop.is_stop_requested();
        let now = self.shared.now_relative();
        self.shared.router.simulation_end(now);
        if stopped_early {
            self.shared.router.simulation_stopped(now, StopReason::ExternalStop);
        } else {
            self.shared.router.simulation_stopped(now, StopReason::AllJobsServed);
        }

        let report = self.shared.router.stats_snapshot(now);

        RunOutcome {
            report,
            stopped_early,
        }
    }
}

/// Final result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: StatsReport,
    pub stopped_early: bool,
}

/// A `Clone`-able handle that can only request a stop and read a live
/// snapshot — everything a signal handler or remote controller needs,
/// without the ability to join or otherwise take ownership of the run.
#[derive(Clone)]
pub struct RunStopper {
    shared: Arc<SharedState>,
}

impl RunStopper {
    pub fn request_stop(&self) {
        self.shared.request_stop_and_drain();
    }

    pub fn stats_snapshot(&self) -> StatsReport {
        self.shared.router.stats_snapshot(self.shared.now_relative())
    }
}

/// Starts a new run: spawns the four worker threads and returns immediately
/// with a handle. Call `.join()` on the handle to wait for completion.
pub fn run(params: SimulationParameters, router: EventRouter) -> RunHandle {
    router.parameters(params.num_jobs, params.queue_capacity, params.printer_paper_capacity);

    let shared = Arc::new(SharedState::new(params, router));
    shared.clock.mark_start(now_us());
    shared.router.simulation_start(0);

    let mut workers = Vec::with_capacity(4);

    let generator_shared = Arc::clone(&shared);
    workers.push(thread::spawn(move || generator::run(generator_shared)));

    for printer_id in 0..2 {
        let printer_shared = Arc::clone(&shared);
        workers.push(thread::spawn(move || printer::run(printer_shared, printer_id)));
    }

    let refiller_shared = Arc::clone(&shared);
    workers.push(thread::spawn(move || refiller::run(refiller_shared)));

    RunHandle { shared, workers }
}
