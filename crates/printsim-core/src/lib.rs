#![forbid(unsafe_code)]

//! Concurrency core for the print-service simulation: a bounded job queue
//! feeding two printer workers, a refiller servicing paper requests, and a
//! stop coordinator that can drain the run early.

pub mod clock;
pub mod config;
pub mod domain;
pub mod orchestrator;
pub mod queue;
pub mod sink;
pub mod stats;
pub mod stop;
mod workers;

pub use config::{ConfigError, SimulationParameters};
pub use domain::Job;
pub use orchestrator::{run, RunHandle, RunOutcome, RunStopper};
pub use sink::{EventRouter, SinkBackend};
pub use stats::{Statistics, StatsReport};
pub use stop::StopHandle;
