//! End-to-end scenarios against the public orchestrator API (spec.md §8).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use printsim_core::sink::{EventRouter, SimEvent, SinkBackend};
use printsim_core::{run, SimulationParameters};

#[derive(Default)]
struct CapturingBackend {
    events: Mutex<Vec<SimEvent>>,
}

impl SinkBackend for CapturingBackend {
    fn trace_line(&self, _line: &str) {}
    fn event(&self, event: &SimEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[test]
fn two_jobs_ample_capacity_both_served() {
    let params =
        SimulationParameters::from_arrival_rate(2, 10, 200, 10_000.0, 10_000.0, 10_000.0, 1, 5, false).unwrap();
    let handle = run(params, EventRouter::new(Box::new(CapturingBackend::default())));
    let outcome = handle.join();
    assert_eq!(outcome.report.jobs_arrived, 2);
    assert_eq!(outcome.report.jobs_served, 2);
    assert_eq!(outcome.report.jobs_dropped, 0);
    assert!(!outcome.stopped_early);
}

#[test]
fn backlog_drops_jobs_past_queue_capacity() {
    // A very fast arrival rate against a tiny queue and slow printers
    // guarantees at least one drop.
    let params =
        SimulationParameters::from_arrival_rate(50, 1, 200, 100_000.0, 50.0, 50.0, 1, 1, false).unwrap();
    let handle = run(params, EventRouter::new(Box::new(CapturingBackend::default())));
    let outcome = handle.join();
    assert_eq!(outcome.report.jobs_arrived, 50);
    assert!(outcome.report.jobs_dropped > 0);
    assert_eq!(
        outcome.report.jobs_served + outcome.report.jobs_dropped + outcome.report.jobs_removed,
        outcome.report.jobs_arrived
    );
}

#[test]
fn refill_replenishes_printer_exactly_to_capacity() {
    // Printer paper capacity is small relative to demand so a refill is
    // forced; each job needs all of the capacity, so exactly one refill per
    // extra job beyond the first.
    let params = SimulationParameters::from_arrival_rate(3, 10, 10, 5_000.0, 50_000.0, 50_000.0, 10, 10, false)
        .unwrap();
    let handle = run(params, EventRouter::new(Box::new(CapturingBackend::default())));
    let outcome = handle.join();
    assert_eq!(outcome.report.jobs_served, 3);
    assert!(outcome.report.refill_count > 0);
}

#[test]
fn external_stop_ends_run_before_natural_completion() {
    let params =
        SimulationParameters::from_arrival_rate(500, 20, 200, 20_000.0, 2_000.0, 2_000.0, 1, 3, false).unwrap();
    let handle = Arc::new(run(params, EventRouter::new(Box::new(CapturingBackend::default()))));
    let stopper = Arc::clone(&handle);
    let stop_thread = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(10));
        stopper.request_stop();
    });
    stop_thread.join().unwrap();
    let handle = Arc::try_unwrap(handle).unwrap_or_else(|_| panic!("still shared"));
    let outcome = handle.join();
    assert!(outcome.stopped_early);
    assert!(outcome.report.jobs_arrived < 500);
}

#[test]
fn empty_run_with_zero_jobs_reports_zero_everything() {
    let params =
        SimulationParameters::from_arrival_rate(0, 10, 200, 1_000.0, 1_000.0, 1_000.0, 1, 5, false).unwrap();
    let handle = run(params, EventRouter::new(Box::new(CapturingBackend::default())));
    let outcome = handle.join();
    assert_eq!(outcome.report.jobs_arrived, 0);
    assert_eq!(outcome.report.jobs_served, 0);
    assert_eq!(outcome.report.drop_probability, 0.0);
}
