//! Shared server state: the broadcast channel every websocket client
//! subscribes to, and the currently running simulation (if any).

use std::sync::Mutex;

use printsim_core::RunStopper;
use tokio::sync::broadcast;

pub struct AppState {
    pub events_tx: broadcast::Sender<serde_json::Value>,
    current: Mutex<Option<RunStopper>>,
}

impl AppState {
    pub fn new(event_buffer: usize) -> Self {
        let (events_tx, _rx) = broadcast::channel(event_buffer);
        Self {
            events_tx,
            current: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.lock().expect("app state lock poisoned").is_some()
    }

    pub fn set_current(&self, stopper: Option<RunStopper>) {
        *self.current.lock().expect("app state lock poisoned") = stopper;
    }

    pub fn current_stopper(&self) -> Option<RunStopper> {
        self.current.lock().expect("app state lock poisoned").clone()
    }

    pub fn broadcast(&self, frame: serde_json::Value) {
        // No receivers (no client connected yet) is not an error.
        let _ = self.events_tx.send(frame);
    }
}
