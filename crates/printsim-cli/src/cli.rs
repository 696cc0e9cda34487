use clap::Parser;

use printsim_core::SimulationParameters;

fn default_parallel_printers() -> u16 {
    2
}

/// Bounded-capacity print-service simulation: jobs arrive, queue behind two
/// printers, and a refiller restocks paper on demand.
#[derive(Debug, Clone, Parser)]
#[command(name = "printsim", version, about)]
pub struct Cli {
    /// Number of jobs to generate before the run ends naturally.
    #[arg(short = 'n', long, env = "PRINTSIM_NUM_JOBS", default_value_t = SimulationParameters::DEFAULT_NUM_JOBS)]
    pub num_jobs: u64,

    /// Bounded job queue capacity.
    #[arg(short = 'q', long, env = "PRINTSIM_QUEUE_CAPACITY", default_value_t = SimulationParameters::DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Sheets of paper each printer holds when full.
    #[arg(long = "paper-capacity", env = "PRINTSIM_PAPER_CAPACITY", default_value_t = SimulationParameters::DEFAULT_PRINTER_PAPER_CAPACITY)]
    pub printer_paper_capacity: u64,

    /// Job arrival rate, in jobs per second.
    #[arg(short = 'a', long = "arrival-rate", env = "PRINTSIM_ARRIVAL_RATE", default_value_t = SimulationParameters::DEFAULT_ARRIVAL_RATE_PER_SEC)]
    pub arrival_rate_per_sec: f64,

    /// Printing rate, in pages per second, per printer.
    #[arg(short = 'r', long = "printing-rate", env = "PRINTSIM_PRINTING_RATE", default_value_t = SimulationParameters::DEFAULT_PRINTING_RATE)]
    pub printing_rate: f64,

    /// Paper refill rate, in pages per second.
    #[arg(long = "refill-rate", env = "PRINTSIM_REFILL_RATE", default_value_t = SimulationParameters::DEFAULT_REFILL_RATE)]
    pub refill_rate: f64,

    /// Lower bound (inclusive) on a job's pages-required draw.
    #[arg(long = "papers-lower", env = "PRINTSIM_PAPERS_LOWER", default_value_t = SimulationParameters::DEFAULT_PAPERS_LOWER)]
    pub papers_lower: u64,

    /// Upper bound (inclusive) on a job's pages-required draw.
    #[arg(long = "papers-upper", env = "PRINTSIM_PAPERS_UPPER", default_value_t = SimulationParameters::DEFAULT_PAPERS_UPPER)]
    pub papers_upper: u64,

    /// Print per-event trace lines as well as the final report.
    #[arg(short = 'v', long, env = "PRINTSIM_DEBUG", default_value_t = false)]
    pub debug: bool,

    /// Number of printer workers. Fixed at 2 by the simulation model; kept
    /// as a flag so the help output documents it rather than hiding it.
    #[arg(long = "printers", default_value_t = default_parallel_printers(), hide = true)]
    pub printers: u16,
}

impl Cli {
    pub fn into_params(self) -> anyhow::Result<SimulationParameters> {
        let params = SimulationParameters::from_arrival_rate(
            self.num_jobs,
            self.queue_capacity,
            self.printer_paper_capacity,
            self.arrival_rate_per_sec,
            self.printing_rate,
            self.refill_rate,
            self.papers_lower,
            self.papers_upper,
            self.debug,
        )?;
        Ok(params)
    }
}
