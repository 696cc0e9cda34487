//! Refiller worker (spec.md §4.6): waits for a printer to request paper,
//! simulates the restock duration proportional to what's actually missing,
//! then tops that printer back up to capacity and wakes whoever was waiting
//! on it.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::SharedState;

pub fn run(shared: Arc<SharedState>) {
    loop {
        let Some((printer_id, papers_needed)) = next_request(&shared) else {
            break;
        };
        if papers_needed == 0 {
            continue;
        }

        let refill_us = ((papers_needed as f64 / shared.params.refill_rate) * 1_000_000.0).round() as u64;
        thread::sleep(Duration::from_micros(refill_us));

        shared.log_lock("refill_queue_lock", "acquiring");
        let mut refill = shared.refill.lock().expect("refill_queue_lock poisoned");
        refill.paper_counts[printer_id] = shared.params.printer_paper_capacity;
        drop(refill);
        shared.log_lock("refill_queue_lock", "releasing");
        shared.refill_cv.notify_all();
    }
}

/// Blocks until a printer is waiting for paper, or the run has ended with
/// nothing pending. Pops the request off the pending queue before returning
/// and reports `papers_needed = capacity - current_paper_count` (spec.md
/// §4.6 step 3), measured at pop time so the refiller only restocks what's
/// actually missing rather than a full capacity's worth every time.
fn next_request(shared: &Arc<SharedState>) -> Option<(usize, u64)> {
    shared.log_lock("refill_queue_lock", "acquiring");
    let mut refill = shared.refill.lock().expect("refill_queue_lock poisoned");
    loop {
        if let Some(printer_id) = refill.pending.pop_front() {
            let papers_needed = shared
                .params
                .printer_paper_capacity
                .saturating_sub(refill.paper_counts[printer_id]);
            shared.log_lock("refill_queue_lock", "releasing");
            return Some((printer_id, papers_needed));
        }
        if shared.stop.is_run_complete() {
            shared.log_lock("refill_queue_lock", "releasing");
            return None;
        }
        refill = shared
            .refill_cv
            .wait_timeout(refill, Duration::from_millis(50))
            .expect("refill_queue_lock poisoned")
            .0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationParameters;
    use crate::sink::{EventRouter, TerminalBackend};

    #[test]
    fn refiller_tops_up_requested_printer() {
        let params =
            SimulationParameters::from_arrival_rate(1, 10, 200, 1_000.0, 1_000.0, 100_000.0, 1, 1, false).unwrap();
        let shared = Arc::new(SharedState::new(params, EventRouter::new(Box::new(TerminalBackend::new(false)))));
        {
            let mut refill = shared.refill.lock().unwrap();
            refill.paper_counts[0] = 0;
            refill.pending.push_back(0);
        }
        shared.stop.request_stop();
        // request_stop alone would make is_run_complete true immediately, so
        // exercise the pending-drain path directly instead of via run().
        let (printer_id, papers_needed) = next_request(&shared).expect("pending request should be served before exit");
        assert_eq!(printer_id, 0);
        assert_eq!(papers_needed, 200);
    }

    #[test]
    fn refiller_only_requests_the_papers_actually_missing() {
        let params =
            SimulationParameters::from_arrival_rate(1, 10, 200, 1_000.0, 1_000.0, 100_000.0, 1, 1, false).unwrap();
        let shared = Arc::new(SharedState::new(params, EventRouter::new(Box::new(TerminalBackend::new(false)))));
        {
            let mut refill = shared.refill.lock().unwrap();
            refill.paper_counts[0] = 150;
            refill.pending.push_back(0);
        }
        shared.stop.request_stop();
        let (printer_id, papers_needed) = next_request(&shared).expect("pending request should be served before exit");
        assert_eq!(printer_id, 0);
        assert_eq!(papers_needed, 50);
    }

    #[test]
    fn refiller_exits_when_run_complete_with_nothing_pending() {
        let params =
            SimulationParameters::from_arrival_rate(1, 10, 200, 1_000.0, 1_000.0, 100_000.0, 1, 1, false).unwrap();
        let shared = Arc::new(SharedState::new(params, EventRouter::new(Box::new(TerminalBackend::new(false)))));
        shared.stop.request_stop();
        run(Arc::clone(&shared));
    }
}
