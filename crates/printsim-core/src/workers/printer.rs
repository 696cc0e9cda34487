//! Printer worker (spec.md §4.5): peeks the job at the head of the queue,
//! ensures the printer has enough paper for it (requesting a refill and
//! waiting, with the job still enqueued, if not), only then dequeues it,
//! "prints" it for a duration derived from the printing rate, and reports
//! completion.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::clock::now_us;
use crate::domain::Job;

use super::SharedState;

pub fn run(shared: Arc<SharedState>, printer_id: usize) {
    loop {
        let Some(job) = next_job(&shared, printer_id) else {
            break;
        };
        service_job(&shared, printer_id, job);
    }
}

/// Blocks until a job at the head of the queue has enough paper available
/// for `printer_id` and dequeues it, the run is stopped, or the run is
/// naturally complete with an empty queue (in which case `None`). Holds
/// `job_queue_lock` continuously from the head peek through the dequeue
/// whenever paper is already sufficient, so no other printer can take the
/// same head job out from under it; only releases it first when paper is
/// insufficient, per spec.md §4.5 step 5 / §5's lock-ordering rule.
fn next_job(shared: &Arc<SharedState>, printer_id: usize) -> Option<Job> {
    loop {
        shared.log_lock("job_queue_lock", "acquiring");
        let mut queue = shared.job_queue.lock().expect("job_queue_lock poisoned");
        loop {
            if queue.first().is_some() {
                break;
            }
            if shared.stop.is_stop_requested() {
                // The stop coordinator already drains the queue when it
                // flips this flag, but a job can slip in afterward
                // (generator woken mid-enqueue); sweep it up here rather
                // than leave it stranded and unaccounted for.
                let now = shared.now_relative();
                for leftover in queue.clear(now_us()) {
                    shared.router.removed_job(now, leftover.id);
                }
                shared.log_lock("job_queue_lock", "releasing");
                return None;
            }
            if shared.stop.all_jobs_arrived() {
                shared.log_lock("job_queue_lock", "releasing");
                return None;
            }
            queue = shared
                .job_queue_cv
                .wait_timeout(queue, Duration::from_millis(50))
                .expect("job_queue_lock poisoned")
                .0;
        }

        let required = queue.first().expect("checked above").papers_required;
        if !has_enough_paper(shared, printer_id, required) {
            drop(queue);
            shared.log_lock("job_queue_lock", "releasing");
            request_refill_and_wait(shared, printer_id, required);
            // Re-check from the top: the head may now belong to a
            // different job, or another printer may have served it while
            // this one waited on the refill (spec.md §4.5 step 5 note).
            continue;
        }

        let (mut job, area_delta) = queue.dequeue(now_us()).expect("head checked above");
        let now = shared.now_relative();
        job.queue_departure_us = Some(now_us());
        let queue_wait = job
            .queue_arrival_us
            .map(|arrival| now_us().saturating_sub(arrival))
            .unwrap_or(0);
        let queue_len = queue.len();
        drop(queue);
        shared.log_lock("job_queue_lock", "releasing");
        shared.router.queue_departure(now, job.id, queue_wait, queue_len, area_delta);
        shared.job_queue_cv.notify_all();
        return Some(job);
    }
}

fn has_enough_paper(shared: &Arc<SharedState>, printer_id: usize, required: u64) -> bool {
    shared.log_lock("refill_queue_lock", "acquiring");
    let refill = shared.refill.lock().expect("refill_queue_lock poisoned");
    let enough = refill.paper_counts[printer_id] >= required;
    drop(refill);
    shared.log_lock("refill_queue_lock", "releasing");
    enough
}

/// Requests a refill for `printer_id` and blocks until enough paper is
/// available. Never holds `job_queue_lock` while waiting here (spec.md §5);
/// the caller has already released it before calling in.
fn request_refill_and_wait(shared: &Arc<SharedState>, printer_id: usize, required: u64) {
    let now = shared.now_relative();
    shared.router.paper_empty(now, printer_id);

    let refill_requested_us = now_us();
    shared.log_lock("refill_queue_lock", "acquiring");
    let mut refill = shared.refill.lock().expect("refill_queue_lock poisoned");
    let papers_needed = shared.params.printer_paper_capacity.saturating_sub(refill.paper_counts[printer_id]);
    if !refill.pending.contains(&printer_id) {
        refill.pending.push_back(printer_id);
    }
    shared.refill_cv.notify_all();
    drop(refill);
    shared.log_lock("refill_queue_lock", "releasing");

    let estimated_us = ((papers_needed as f64 / shared.params.refill_rate) * 1_000_000.0).round() as u64;
    shared
        .router
        .paper_refill_start(shared.now_relative(), printer_id, papers_needed, estimated_us);

    shared.log_lock("refill_queue_lock", "acquiring");
    let mut refill = shared.refill.lock().expect("refill_queue_lock poisoned");
    while refill.paper_counts[printer_id] < required && !shared.stop.is_stop_requested() {
        refill = shared
            .refill_cv
            .wait_timeout(refill, Duration::from_millis(50))
            .expect("refill_queue_lock poisoned")
            .0;
    }
    drop(refill);
    shared.log_lock("refill_queue_lock", "releasing");

    let refill_wait_us = now_us().saturating_sub(refill_requested_us);
    shared
        .router
        .paper_refill_end(shared.now_relative(), printer_id, refill_wait_us, papers_needed);
}

fn service_job(shared: &Arc<SharedState>, printer_id: usize, mut job: Job) {
    let service_us = ((job.papers_required as f64 / shared.params.printing_rate) * 1_000_000.0).round() as u64;
    job.service_arrival_us = Some(now_us());
    let now = shared.now_relative();
    shared
        .router
        .printer_arrival(now, job.id, printer_id, job.papers_required, service_us / 1_000);

    thread::sleep(Duration::from_micros(service_us));

    {
        shared.log_lock("refill_queue_lock", "acquiring");
        let mut refill = shared.refill.lock().expect("refill_queue_lock poisoned");
        refill.paper_counts[printer_id] = refill.paper_counts[printer_id].saturating_sub(job.papers_required);
        drop(refill);
        shared.log_lock("refill_queue_lock", "releasing");
    }

    let departure_us = now_us();
    job.service_departure_us = Some(departure_us);
    let now = shared.now_relative();
    let system_time_us = job.system_time_us().unwrap_or(0);
    shared
        .router
        .system_departure(now, job.id, printer_id, job.papers_required, service_us, system_time_us);

    shared.check_natural_completion();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationParameters;
    use crate::sink::{EventRouter, TerminalBackend};

    #[test]
    fn printer_serves_a_pre_queued_job() {
        let params = SimulationParameters::from_arrival_rate(1, 10, 200, 1_000.0, 1_000.0, 1_000.0, 1, 1, false)
            .unwrap();
        let shared = Arc::new(SharedState::new(params, EventRouter::new(Box::new(TerminalBackend::new(false)))));
        {
            let mut job = Job::new(1, 0, 5);
            job.queue_arrival_us = Some(now_us());
            let mut queue = shared.job_queue.lock().unwrap();
            queue.enqueue(job, now_us()).unwrap();
        }
        shared.stop.mark_all_jobs_arrived();
        run(Arc::clone(&shared), 0);
        let report = shared.router.stats_snapshot(shared.now_relative());
        assert_eq!(report.jobs_served, 1);
    }

    #[test]
    fn printer_exits_cleanly_on_empty_completed_queue() {
        let params = SimulationParameters::from_arrival_rate(1, 10, 200, 1_000.0, 1_000.0, 1_000.0, 1, 1, false)
            .unwrap();
        let shared = Arc::new(SharedState::new(params, EventRouter::new(Box::new(TerminalBackend::new(false)))));
        shared.stop.mark_all_jobs_arrived();
        run(Arc::clone(&shared), 1);
        let report = shared.router.stats_snapshot(shared.now_relative());
        assert_eq!(report.jobs_served, 0);
    }

    #[test]
    fn printer_requests_a_refill_when_paper_is_short() {
        let params = SimulationParameters::from_arrival_rate(1, 10, 20, 1_000.0, 1_000_000.0, 1_000_000.0, 10, 10, false)
            .unwrap();
        let shared = Arc::new(SharedState::new(params, EventRouter::new(Box::new(TerminalBackend::new(false)))));
        {
            let mut job = Job::new(1, 0, 10);
            job.queue_arrival_us = Some(now_us());
            let mut queue = shared.job_queue.lock().unwrap();
            queue.enqueue(job, now_us()).unwrap();
        }
        // Start this printer short of paper so it has to request a refill
        // before it can serve the pre-queued job (capacity stays ≥ any job's
        // requirement per spec.md §4.5's single-refill-suffices guarantee).
        shared.refill.lock().unwrap().paper_counts[0] = 3;
        shared.stop.mark_all_jobs_arrived();
        let shared_refiller = Arc::clone(&shared);
        let refiller = thread::spawn(move || crate::workers::refiller::run(shared_refiller));
        run(Arc::clone(&shared), 0);
        refiller.join().unwrap();
        let report = shared.router.stats_snapshot(shared.now_relative());
        assert_eq!(report.jobs_served, 1);
        assert_eq!(report.refill_count, 1);
        assert_eq!(report.papers_refilled, 17);
    }
}
