//! Event routing: one `SimEvent` enum covers every trace line and aggregate
//! report the simulation can emit (spec.md §6), and `EventRouter` is the
//! single place that updates `Statistics` under `stats_lock` before handing
//! the event to whichever backend is attached — terminal stdout for the CLI,
//! or a JSON frame stream for the websocket controller.

mod json;
mod terminal;

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

pub use json::JsonBackend;
pub use terminal::TerminalBackend;

use crate::clock::trace_prefix;
use crate::stats::{Statistics, StatsReport};

/// One domain event, in emission order, as produced by a worker thread.
/// `#[serde(tag = "type")]` matches the `{"type": "...", ...}` wire shape
/// spec.md §6 mandates for the JSON sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    Parameters {
        num_jobs: u64,
        queue_capacity: usize,
        printer_paper_capacity: u64,
    },
    SimulationStart,
    SimulationEnd,
    SimulationStopped {
        reason: StopReason,
    },
    SystemArrival {
        job_id: u64,
        papers_required: u64,
    },
    DroppedJob {
        job_id: u64,
    },
    RemovedJob {
        job_id: u64,
    },
    QueueArrival {
        job_id: u64,
        queue_len: usize,
    },
    QueueDeparture {
        job_id: u64,
        queue_wait_us: u64,
        queue_len: usize,
    },
    PrinterArrival {
        job_id: u64,
        printer_id: usize,
        papers_required: u64,
    },
    SystemDeparture {
        job_id: u64,
        printer_id: usize,
        service_us: u64,
        system_time_us: u64,
    },
    PaperEmpty {
        printer_id: usize,
    },
    PaperRefillStart {
        printer_id: usize,
        papers_needed: u64,
    },
    PaperRefillEnd {
        printer_id: usize,
        refill_wait_us: u64,
    },
    Statistics {
        report: StatsReport,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    AllJobsServed,
    ExternalStop,
}

/// A sink for rendered trace lines and raw event frames. Implementors decide
/// how (or whether) to surface each; `EventRouter` guarantees every event is
/// offered exactly once, in emission order for a single caller thread.
pub trait SinkBackend: Send + Sync {
    fn trace_line(&self, line: &str);
    fn event(&self, event: &SimEvent);
}

/// Fans one `SimEvent` out to a backend while keeping `Statistics` current.
/// Every worker holds a `&EventRouter` (never the raw `Statistics` directly)
/// so statistics bookkeeping cannot be forgotten at a call site.
pub struct EventRouter {
    backend: Box<dyn SinkBackend>,
    stats: Mutex<Statistics>,
}

impl EventRouter {
    pub fn new(backend: Box<dyn SinkBackend>) -> Self {
        Self {
            backend,
            stats: Mutex::new(Statistics::new()),
        }
    }

    /// Runs `f` against the shared statistics under `stats_lock` (spec.md
    /// §5's `job_queue_lock → stats_lock` / `refill_queue_lock → stats_lock`
    /// ordering: callers must never hold `stats_lock` while acquiring either
    /// queue lock).
    pub fn with_stats<R>(&self, f: impl FnOnce(&mut Statistics) -> R) -> R {
        let mut stats = self.stats.lock().expect("stats_lock poisoned");
        f(&mut stats)
    }

    /// `elapsed_us` should be the run's current simulation-relative time;
    /// every rate/utilization field is derived against it.
    pub fn stats_snapshot(&self, elapsed_us: u64) -> StatsReport {
        self.stats.lock().expect("stats_lock poisoned").report(elapsed_us)
    }

    fn emit(&self, now_relative_us: u64, line: String, event: SimEvent) {
        self.backend.trace_line(&format!("{}{line}", trace_prefix(now_relative_us)));
        self.backend.event(&event);
    }

    pub fn parameters(&self, num_jobs: u64, queue_capacity: usize, printer_paper_capacity: u64) {
        self.backend.event(&SimEvent::Parameters {
            num_jobs,
            queue_capacity,
            printer_paper_capacity,
        });
    }

    pub fn simulation_start(&self, now: u64) {
        self.emit(now, "simulation begins".to_string(), SimEvent::SimulationStart);
    }

    pub fn simulation_end(&self, now: u64) {
        let report = self.stats_snapshot(now);
        let (ms, us) = crate::clock::split_ms_us(now);
        self.emit(now, format!("simulation ends, duration = {ms}.{us:03}ms"), SimEvent::SimulationEnd);
        self.backend.event(&SimEvent::Statistics { report });
    }

    pub fn simulation_stopped(&self, now: u64, reason: StopReason) {
        let (ms, us) = crate::clock::split_ms_us(now);
        self.emit(
            now,
            format!("simulation stopped, duration = {ms}.{us:03}ms"),
            SimEvent::SimulationStopped { reason },
        );
    }

    pub fn system_arrival(&self, now: u64, job_id: u64, papers_required: u64, inter_arrival_us: Option<u64>) {
        self.with_stats(|s| s.record_arrival(inter_arrival_us));
        let plural = if papers_required == 1 { "" } else { "s" };
        self.emit(
            now,
            format!("job{job_id} arrives, needs {papers_required} paper{plural}"),
            SimEvent::SystemArrival { job_id, papers_required },
        );
    }

    pub fn dropped_job(&self, now: u64, job_id: u64) {
        self.with_stats(Statistics::record_drop);
        self.emit(now, format!("job{job_id} dropped, queue full"), SimEvent::DroppedJob { job_id });
    }

    pub fn removed_job(&self, now: u64, job_id: u64) {
        self.with_stats(Statistics::record_removed);
        self.emit(now, format!("job{job_id} removed from system"), SimEvent::RemovedJob { job_id });
    }

    pub fn queue_arrival(&self, now: u64, job_id: u64, queue_len: usize, area_delta_us: u128) {
        self.with_stats(|s| s.record_queue_area(area_delta_us));
        self.emit(
            now,
            format!("job{job_id} enters queue, queue length = {queue_len}"),
            SimEvent::QueueArrival { job_id, queue_len },
        );
    }

    pub fn queue_departure(&self, now: u64, job_id: u64, queue_wait_us: u64, queue_len: usize, area_delta_us: u128) {
        self.with_stats(|s| {
            s.record_queue_area(area_delta_us);
            s.record_queue_wait(queue_wait_us);
        });
        let (ms, us) = crate::clock::split_ms_us(queue_wait_us);
        self.emit(
            now,
            format!("job{job_id} leaves queue, time in queue = {ms}.{us:03}ms, queue_length = {queue_len}"),
            SimEvent::QueueDeparture { job_id, queue_wait_us, queue_len },
        );
    }

    pub fn printer_arrival(&self, now: u64, job_id: u64, printer_id: usize, papers_required: u64, estimated_ms: u64) {
        self.emit(
            now,
            format!("job{job_id} begins service at printer{printer_id}, printing {papers_required} pages in about {estimated_ms}ms"),
            SimEvent::PrinterArrival { job_id, printer_id, papers_required },
        );
    }

    pub fn system_departure(
        &self,
        now: u64,
        job_id: u64,
        printer_id: usize,
        papers_used: u64,
        service_us: u64,
        system_time_us: u64,
    ) {
        self.with_stats(|s| s.record_service(printer_id, papers_used, service_us, system_time_us));
        let (ms, us) = crate::clock::split_ms_us(service_us);
        self.emit(
            now,
            format!("job{job_id} departs from printer{printer_id}, service time = {ms}.{us:03}ms"),
            SimEvent::SystemDeparture { job_id, printer_id, service_us, system_time_us },
        );
    }

    pub fn paper_empty(&self, now: u64, printer_id: usize) {
        self.emit(now, format!("printer{printer_id} is out of paper"), SimEvent::PaperEmpty { printer_id });
    }

    pub fn paper_refill_start(&self, now: u64, printer_id: usize, papers_needed: u64, estimated_us: u64) {
        let (ms, us) = crate::clock::split_ms_us(estimated_us);
        self.emit(
            now,
            format!("printer{printer_id} starts refilling {papers_needed} papers, estimated time = {ms}.{us:03}ms"),
            SimEvent::PaperRefillStart { printer_id, papers_needed },
        );
    }

    pub fn paper_refill_end(&self, now: u64, printer_id: usize, refill_wait_us: u64, papers_needed: u64) {
        self.with_stats(|s| s.record_refill(refill_wait_us, papers_needed));
        let (ms, us) = crate::clock::split_ms_us(refill_wait_us);
        self.emit(
            now,
            format!("printer{printer_id} finishes refilling, actual time = {ms}.{us:03}ms"),
            SimEvent::PaperRefillEnd { printer_id, refill_wait_us },
        );
    }

    pub fn statistics(&self, now: u64) {
        let report = self.stats_snapshot(now);
        self.emit(now, "statistics snapshot".to_string(), SimEvent::Statistics { report });
    }
}
