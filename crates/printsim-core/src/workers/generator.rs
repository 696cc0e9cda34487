//! Job generator worker (spec.md §4.4): produces `num_jobs` jobs at the
//! configured inter-arrival rate, dropping any that arrive while the queue
//! is full.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::clock::now_us;
use crate::domain::Job;

use super::SharedState;

pub fn run(shared: Arc<SharedState>) {
    let mut rng = rand::thread_rng();
    let lower = shared.params.papers_required_lower_bound;
    let upper = shared.params.papers_required_upper_bound;
    let inter_arrival = Duration::from_micros(shared.params.job_arrival_time_us);
    let mut previous_arrival_us: Option<u64> = None;

    for job_id in 1..=shared.params.num_jobs {
        if shared.stop.is_stop_requested() {
            break;
        }
        thread::sleep(inter_arrival);
        if shared.stop.is_stop_requested() {
            break;
        }

        let papers_required = if lower == upper {
            lower
        } else {
            rng.gen_range(lower..=upper)
        };
        let mut job = Job::new(job_id, shared.params.job_arrival_time_us, papers_required);
        let arrival_us = now_us();
        job.system_arrival_us = Some(arrival_us);

        let inter_arrival_us = previous_arrival_us.map(|prev| arrival_us.saturating_sub(prev));
        previous_arrival_us = Some(arrival_us);

        let now = shared.clock.relative(arrival_us);
        shared.router.system_arrival(now, job_id, papers_required, inter_arrival_us);

        shared.log_lock("job_queue_lock", "acquiring");
        let mut queue = shared.job_queue.lock().expect("job_queue_lock poisoned");
        match queue.enqueue(job, arrival_us) {
            Ok(area_delta) => {
                let queue_len = queue.len();
                drop(queue);
                shared.log_lock("job_queue_lock", "releasing");
                shared.router.queue_arrival(now, job_id, queue_len, area_delta);
                shared.job_queue_cv.notify_all();
            }
            Err(_dropped) => {
                drop(queue);
                shared.log_lock("job_queue_lock", "releasing");
                shared.router.dropped_job(now, job_id);
                shared.check_natural_completion();
            }
        }
    }

    shared.stop.mark_all_jobs_arrived();
    shared.wake_all_workers();
    shared.check_natural_completion();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationParameters;
    use crate::sink::{EventRouter, TerminalBackend};

    #[test]
    fn generator_marks_all_jobs_arrived_when_done() {
        let params = SimulationParameters::from_arrival_rate(2, 10, 200, 10_000.0, 5.0, 15.0, 1, 1, false)
            .unwrap();
        let shared = Arc::new(SharedState::new(params, EventRouter::new(Box::new(TerminalBackend::new(false)))));
        run(Arc::clone(&shared));
        assert!(shared.stop.all_jobs_arrived());
        let report = shared.router.stats_snapshot(shared.now_relative());
        assert_eq!(report.jobs_arrived, 2);
    }

    #[test]
    fn generator_drops_jobs_when_queue_full() {
        let params = SimulationParameters::from_arrival_rate(3, 1, 200, 50_000.0, 5.0, 15.0, 1, 1, false)
            .unwrap();
        let shared = Arc::new(SharedState::new(params, EventRouter::new(Box::new(TerminalBackend::new(false)))));
        // No printer draining the queue, so with capacity 1 at least one of
        // the three jobs must be dropped.
        run(Arc::clone(&shared));
        let report = shared.router.stats_snapshot(shared.now_relative());
        assert_eq!(report.jobs_arrived, 3);
        assert!(report.jobs_dropped >= 1);
    }
}
