use clap::Parser;

/// Websocket controller for the print-service simulation.
#[derive(Debug, Clone, Parser)]
#[command(name = "printsim-server", version, about)]
pub struct Cli {
    /// Address to bind the HTTP/websocket listener on.
    #[arg(long, env = "PRINTSIM_BIND", default_value = "127.0.0.1:7878")]
    pub bind: String,

    /// Maximum number of buffered event frames per connected client before
    /// the slowest-consumer lag policy kicks in (spec.md §6).
    #[arg(long, env = "PRINTSIM_EVENT_BUFFER", default_value_t = 1024)]
    pub event_buffer: usize,
}
