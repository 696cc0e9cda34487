mod cli;
mod shutdown;

use std::sync::{mpsc, Arc};

use clap::Parser;

use printsim_core::run;
use printsim_core::sink::{EventRouter, TerminalBackend};

use crate::cli::Cli;
use crate::shutdown::{spawn_signal_handler, ShutdownController, ShutdownEvent};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let debug = cli.debug;

    // `--debug` only raises the *default* level (so the lock-acquisition
    // traces in printsim-core's workers surface without extra setup);
    // RUST_LOG always wins when set.
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .init();

    let params = cli.into_params()?;

    let backend = Box::new(TerminalBackend::new(debug));
    let router = EventRouter::new(backend);
    let handle = run(params, router);

    let shutdown = Arc::new(ShutdownController::new());
    let (events_tx, events_rx) = mpsc::channel();
    spawn_signal_handler(shutdown, events_tx)?;

    let stopper = handle.stopper();
    std::thread::spawn(move || {
        while let Ok(event) = events_rx.recv() {
            match event {
                ShutdownEvent::Graceful => {
                    eprintln!(
                        "stop requested — finishing in-flight jobs before exiting (press Ctrl+C again to exit immediately)"
                    );
                    stopper.request_stop();
                }
                ShutdownEvent::Immediate => {
                    eprintln!("stop requested again — exiting immediately");
                    std::process::exit(130);
                }
            }
        }
    });

    let outcome = handle.join();

    if outcome.stopped_early {
        eprintln!("simulation stopped before completion");
    }
    println!("{:#?}", outcome.report);

    Ok(())
}
