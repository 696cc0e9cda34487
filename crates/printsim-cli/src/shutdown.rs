//! Dedicated OS thread that blocks on SIGINT/SIGTERM and turns the first
//! signal into a graceful stop request, the second into an immediate exit.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

#[derive(Debug)]
pub struct ShutdownController {
    received: AtomicU8,
}

#[derive(Debug, Clone, Copy)]
pub enum ShutdownEvent {
    Graceful,
    Immediate,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            received: AtomicU8::new(0),
        }
    }

    fn bump(&self) -> u8 {
        self.received.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the signal-wait thread. Returns immediately; events arrive on
/// `events_tx` as signals are delivered.
pub fn spawn_signal_handler(
    shutdown: Arc<ShutdownController>,
    events_tx: mpsc::Sender<ShutdownEvent>,
) -> anyhow::Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::spawn(move || {
        for _ in signals.forever() {
            let n = shutdown.bump();
            let event = if n == 1 { ShutdownEvent::Graceful } else { ShutdownEvent::Immediate };
            if events_tx.send(event).is_err() {
                return;
            }
            if n > 1 {
                return;
            }
        }
    });
    Ok(())
}
