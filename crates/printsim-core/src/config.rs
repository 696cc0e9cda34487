//! Simulation parameters and their validation, shared by the CLI and server
//! front ends.

use serde::{Deserialize, Serialize};

/// Immutable-after-parse configuration for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationParameters {
    pub num_jobs: u64,
    pub job_arrival_time_us: u64,
    pub papers_required_lower_bound: u64,
    pub papers_required_upper_bound: u64,
    pub queue_capacity: usize,
    pub printing_rate: f64,
    pub printer_paper_capacity: u64,
    pub refill_rate: f64,
    #[serde(default)]
    pub debug: bool,
}

impl SimulationParameters {
    pub const DEFAULT_NUM_JOBS: u64 = 20;
    pub const DEFAULT_QUEUE_CAPACITY: usize = 10;
    pub const DEFAULT_PRINTER_PAPER_CAPACITY: u64 = 200;
    pub const DEFAULT_ARRIVAL_RATE_PER_SEC: f64 = 2.0;
    pub const DEFAULT_PRINTING_RATE: f64 = 5.0;
    pub const DEFAULT_REFILL_RATE: f64 = 15.0;
    pub const DEFAULT_PAPERS_LOWER: u64 = 1;
    pub const DEFAULT_PAPERS_UPPER: u64 = 20;

    /// Builds parameters from the CLI's jobs/sec arrival rate, matching
    /// `job_arrival_time_us = 1e6 / rate` (spec.md §6).
    pub fn from_arrival_rate(
        num_jobs: u64,
        queue_capacity: usize,
        printer_paper_capacity: u64,
        arrival_rate_per_sec: f64,
        printing_rate: f64,
        refill_rate: f64,
        papers_lower: u64,
        papers_upper: u64,
        debug: bool,
    ) -> Result<Self, ConfigError> {
        if arrival_rate_per_sec <= 0.0 {
            return Err(ConfigError::NonPositive("arrival rate"));
        }
        let job_arrival_time_us = (1_000_000.0 / arrival_rate_per_sec).round() as u64;
        let (lower, upper) = if papers_lower > papers_upper {
            (papers_upper, papers_lower)
        } else {
            (papers_lower, papers_upper)
        };

        let params = Self {
            num_jobs,
            job_arrival_time_us,
            papers_required_lower_bound: lower,
            papers_required_upper_bound: upper,
            queue_capacity,
            printing_rate,
            printer_paper_capacity,
            refill_rate,
            debug,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::NonPositive("queue capacity"));
        }
        if self.printer_paper_capacity == 0 {
            return Err(ConfigError::NonPositive("printer paper capacity"));
        }
        if self.printing_rate <= 0.0 {
            return Err(ConfigError::NonPositive("printing rate"));
        }
        if self.refill_rate <= 0.0 {
            return Err(ConfigError::NonPositive("refill rate"));
        }
        if self.papers_required_lower_bound == 0 {
            return Err(ConfigError::NonPositive("papers_lower"));
        }
        if self.papers_required_upper_bound > self.printer_paper_capacity {
            return Err(ConfigError::PapersExceedCapacity);
        }
        Ok(())
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self::from_arrival_rate(
            Self::DEFAULT_NUM_JOBS,
            Self::DEFAULT_QUEUE_CAPACITY,
            Self::DEFAULT_PRINTER_PAPER_CAPACITY,
            Self::DEFAULT_ARRIVAL_RATE_PER_SEC,
            Self::DEFAULT_PRINTING_RATE,
            Self::DEFAULT_REFILL_RATE,
            Self::DEFAULT_PAPERS_LOWER,
            Self::DEFAULT_PAPERS_UPPER,
            false,
        )
        .expect("built-in defaults are always valid")
    }
}

/// Configuration-time validation failure; reported to stderr and exit code 1
/// by the CLI front end.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("papers_upper must not exceed printer paper capacity")]
    PapersExceedCapacity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_inverted_bounds() {
        let p = SimulationParameters::from_arrival_rate(10, 10, 200, 10.0, 5.0, 15.0, 30, 10, false)
            .unwrap();
        assert_eq!(p.papers_required_lower_bound, 10);
        assert_eq!(p.papers_required_upper_bound, 30);
    }

    #[test]
    fn rejects_non_positive_rate() {
        let err =
            SimulationParameters::from_arrival_rate(10, 10, 200, 0.0, 5.0, 15.0, 1, 10, false)
                .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive("arrival rate")));
    }

    #[test]
    fn default_params_are_valid() {
        SimulationParameters::default().validate().unwrap();
    }
}
