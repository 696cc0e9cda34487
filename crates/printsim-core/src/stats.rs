//! Run statistics: raw counters accumulated under `stats_lock` during the
//! run (spec.md §4.8), plus derived metrics computed on demand at report
//! time so every division is guarded against a zero denominator.

use serde::{Deserialize, Serialize};

/// Raw counters updated incrementally as events occur. All fields are
/// cumulative across the whole run; nothing here is reset mid-run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    pub jobs_arrived: u64,
    pub jobs_dropped: u64,
    pub jobs_served: u64,
    pub jobs_removed: u64,

    pub total_inter_arrival_time_us: u128,
    pub total_queue_wait_us: u128,
    pub total_system_time_us: u128,
    pub sum_of_system_time_squared_us2: u128,

    /// Sum of `queue_length * elapsed_time_us` since the previous queue
    /// mutation, accumulated on every `TimedQueue::enqueue`/`dequeue` call.
    pub area_num_in_job_queue_us: u128,

    pub total_papers_printed: u64,
    pub printer_busy_time_us: [u128; 2],
    pub printer_jobs_served: [u64; 2],
    pub printer_paper_used: [u64; 2],

    pub refill_count: u64,
    pub total_refill_wait_us: u128,
    pub papers_refilled: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// `inter_arrival_us` is the measured gap since the previous arrival;
    /// `None` for the first job, which has no predecessor to measure against
    /// (matches §4.8's `avg_inter_arrival` denominator of `jobs_arrived - 1`).
    pub fn record_arrival(&mut self, inter_arrival_us: Option<u64>) {
        self.jobs_arrived += 1;
        if let Some(gap) = inter_arrival_us {
            self.total_inter_arrival_time_us += gap as u128;
        }
    }

    pub fn record_drop(&mut self) {
        self.jobs_dropped += 1;
    }

    pub fn record_removed(&mut self) {
        self.jobs_removed += 1;
    }

    pub fn record_queue_area(&mut self, area_delta_us: u128) {
        self.area_num_in_job_queue_us += area_delta_us;
    }

    pub fn record_queue_wait(&mut self, wait_us: u64) {
        self.total_queue_wait_us += wait_us as u128;
    }

    pub fn record_service(&mut self, printer_index: usize, papers_used: u64, busy_us: u64, system_time_us: u64) {
        self.jobs_served += 1;
        self.total_papers_printed += papers_used;
        self.total_system_time_us += system_time_us as u128;
        self.sum_of_system_time_squared_us2 += (system_time_us as u128) * (system_time_us as u128);
        self.printer_busy_time_us[printer_index] += busy_us as u128;
        self.printer_jobs_served[printer_index] += 1;
        self.printer_paper_used[printer_index] += papers_used;
    }

    pub fn record_refill(&mut self, wait_us: u64, papers_needed: u64) {
        self.refill_count += 1;
        self.total_refill_wait_us += wait_us as u128;
        self.papers_refilled += papers_needed;
    }

    /// Computes every derived metric from the current raw counters against
    /// `elapsed_us` (time since the run started). Safe to call mid-run for
    /// a live snapshot (spec.md's `status`/`statistics` event), not just at
    /// the end — the caller supplies the current elapsed time each time
    /// rather than this struct tracking it, so a live snapshot's rates
    /// aren't stuck at zero before the run finishes.
    pub fn report(&self, elapsed_us: u64) -> StatsReport {
        let avg_queue_wait_us = checked_avg(self.total_queue_wait_us, self.jobs_served);
        let avg_system_time_us = checked_avg(self.total_system_time_us, self.jobs_served);
        let avg_inter_arrival_us = checked_avg(self.total_inter_arrival_time_us, self.jobs_arrived.saturating_sub(1));
        let system_time_stddev_us = {
            let mean = avg_system_time_us;
            let mean_of_squares = checked_avg(self.sum_of_system_time_squared_us2, self.jobs_served);
            (mean_of_squares - mean * mean).max(0.0).sqrt()
        };
        let avg_queue_length = if elapsed_us == 0 {
            0.0
        } else {
            self.area_num_in_job_queue_us as f64 / elapsed_us as f64
        };
        let avg_refill_wait_us = checked_avg(self.total_refill_wait_us, self.refill_count);
        let drop_probability = if self.jobs_arrived == 0 {
            0.0
        } else {
            self.jobs_dropped as f64 / self.jobs_arrived as f64
        };
        let arrival_rate_per_sec = if elapsed_us == 0 {
            0.0
        } else {
            self.jobs_arrived as f64 / (elapsed_us as f64 / 1_000_000.0)
        };
        let printer_utilization = std::array::from_fn(|i| {
            if elapsed_us == 0 {
                0.0
            } else {
                self.printer_busy_time_us[i] as f64 / elapsed_us as f64
            }
        });
        let avg_service_us = std::array::from_fn(|i| checked_avg(self.printer_busy_time_us[i], self.printer_jobs_served[i]));

        StatsReport {
            jobs_arrived: self.jobs_arrived,
            jobs_dropped: self.jobs_dropped,
            jobs_served: self.jobs_served,
            jobs_removed: self.jobs_removed,
            total_papers_printed: self.total_papers_printed,
            printer_paper_used: self.printer_paper_used,
            refill_count: self.refill_count,
            papers_refilled: self.papers_refilled,
            avg_queue_wait_us,
            avg_system_time_us,
            avg_inter_arrival_us,
            system_time_stddev_us,
            avg_queue_length,
            avg_refill_wait_us,
            drop_probability,
            arrival_rate_per_sec,
            printer_utilization,
            avg_service_us,
            run_duration_us: elapsed_us,
        }
    }
}

fn checked_avg(total: u128, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Derived metrics, computed from `Statistics::report` and safe to serialize
/// straight into a `"statistics"` event frame (spec.md §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsReport {
    pub jobs_arrived: u64,
    pub jobs_dropped: u64,
    pub jobs_served: u64,
    pub jobs_removed: u64,
    pub total_papers_printed: u64,
    pub printer_paper_used: [u64; 2],
    pub refill_count: u64,
    pub papers_refilled: u64,

    pub avg_queue_wait_us: f64,
    pub avg_system_time_us: f64,
    pub avg_inter_arrival_us: f64,
    pub system_time_stddev_us: f64,
    pub avg_queue_length: f64,
    pub avg_refill_wait_us: f64,
    pub drop_probability: f64,
    pub arrival_rate_per_sec: f64,
    pub printer_utilization: [f64; 2],
    pub avg_service_us: [f64; 2],

    pub run_duration_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_run_reports_zero_not_nan() {
        let stats = Statistics::new();
        let report = stats.report(0);
        assert_eq!(report.avg_queue_wait_us, 0.0);
        assert_eq!(report.drop_probability, 0.0);
        assert_eq!(report.arrival_rate_per_sec, 0.0);
        assert_eq!(report.printer_utilization, [0.0, 0.0]);
    }

    #[test]
    fn drop_probability_tracks_arrivals_and_drops() {
        let mut stats = Statistics::new();
        stats.record_arrival(None);
        stats.record_arrival(Some(500));
        stats.record_drop();
        let report = stats.report(1_000);
        assert_eq!(report.drop_probability, 0.5);
        assert_eq!(report.avg_inter_arrival_us, 500.0);
    }

    #[test]
    fn printer_utilization_is_per_printer() {
        let mut stats = Statistics::new();
        stats.record_service(0, 5, 500_000, 500_000);
        let report = stats.report(1_000_000);
        assert_eq!(report.printer_utilization[0], 0.5);
        assert_eq!(report.printer_utilization[1], 0.0);
        assert_eq!(report.printer_paper_used[0], 5);
    }

    #[test]
    fn system_time_stddev_is_zero_for_identical_samples() {
        let mut stats = Statistics::new();
        stats.record_service(0, 1, 100, 1_000);
        stats.record_service(1, 1, 100, 1_000);
        let report = stats.report(10_000);
        assert!(report.system_time_stddev_us.abs() < 1e-6);
    }

    #[test]
    fn refill_accumulates_papers_refilled() {
        let mut stats = Statistics::new();
        stats.record_refill(1_000, 20);
        stats.record_refill(500, 10);
        let report = stats.report(10_000);
        assert_eq!(report.papers_refilled, 30);
        assert_eq!(report.refill_count, 2);
    }
}
