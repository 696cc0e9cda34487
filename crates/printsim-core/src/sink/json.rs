//! JSON frame sink used by the websocket controller. Kept free of any
//! particular channel type so `printsim-core` doesn't have to depend on
//! tokio: the server wires a closure that forwards frames into its own
//! broadcast channel.
//!
//! Wire format (spec.md §6): every trace line becomes `{"type":"log",
//! "message":"<same text>"}`; parameters become `{"type":"params","params":
//! {...}}`; statistics become `{"type":"statistics","data":{...}}`. Other
//! `SimEvent` variants already have their text rendered as a log frame via
//! `trace_line`, so `event` only has work to do for the two frame kinds the
//! wire format names explicitly.

use serde_json::json;

use super::{SimEvent, SinkBackend};

/// Delivers one JSON frame per call, in the exact shape the websocket
/// controller's wire protocol mandates. Delivery is best-effort: a full or
/// closed channel on the caller's side must not block or panic a simulation
/// worker thread, so `deliver` takes `&dyn Fn` rather than a blocking
/// channel `Sender` directly.
pub struct JsonBackend {
    deliver: Box<dyn Fn(serde_json::Value) + Send + Sync>,
}

impl JsonBackend {
    pub fn new(deliver: impl Fn(serde_json::Value) + Send + Sync + 'static) -> Self {
        Self {
            deliver: Box::new(deliver),
        }
    }
}

impl SinkBackend for JsonBackend {
    fn trace_line(&self, line: &str) {
        (self.deliver)(json!({"type": "log", "message": line}));
    }

    fn event(&self, event: &SimEvent) {
        match event {
            SimEvent::Parameters {
                num_jobs,
                queue_capacity,
                printer_paper_capacity,
            } => {
                (self.deliver)(json!({
                    "type": "params",
                    "params": {
                        "num_jobs": num_jobs,
                        "queue_capacity": queue_capacity,
                        "printer_paper_capacity": printer_paper_capacity,
                    },
                }));
            }
            SimEvent::Statistics { report } => match serde_json::to_value(report) {
                Ok(data) => (self.deliver)(json!({"type": "statistics", "data": data})),
                Err(err) => tracing::warn!(error = %err, "failed to encode statistics as JSON"),
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn trace_line_becomes_a_log_frame() {
        let received = Arc::new(Mutex::new(None));
        let received_clone = Arc::clone(&received);
        let backend = JsonBackend::new(move |value| {
            *received_clone.lock().unwrap() = Some(value);
        });
        backend.trace_line("job1 arrives");
        let value = received.lock().unwrap().clone().unwrap();
        assert_eq!(value["type"], "log");
        assert_eq!(value["message"], "job1 arrives");
    }

    #[test]
    fn parameters_event_becomes_a_params_frame() {
        let received = Arc::new(Mutex::new(None));
        let received_clone = Arc::clone(&received);
        let backend = JsonBackend::new(move |value| {
            *received_clone.lock().unwrap() = Some(value);
        });
        backend.event(&SimEvent::Parameters {
            num_jobs: 10,
            queue_capacity: 5,
            printer_paper_capacity: 200,
        });
        let value = received.lock().unwrap().clone().unwrap();
        assert_eq!(value["type"], "params");
        assert_eq!(value["params"]["num_jobs"], 10);
    }

    #[test]
    fn other_events_produce_no_frame_of_their_own() {
        let received = Arc::new(Mutex::new(None));
        let received_clone = Arc::clone(&received);
        let backend = JsonBackend::new(move |value| {
            *received_clone.lock().unwrap() = Some(value);
        });
        backend.event(&SimEvent::SimulationStart);
        assert!(received.lock().unwrap().is_none());
    }
}
