//! Stdout sink used by the CLI front end.

use std::io::Write;
use std::sync::Mutex;

use super::{SimEvent, SinkBackend};

/// Writes trace lines to stdout under a lock so interleaved printer threads
/// never tear a line in half. Raw `SimEvent`s are otherwise ignored — the
/// CLI front end only needs the human-readable trace.
pub struct TerminalBackend {
    out: Mutex<std::io::Stdout>,
    debug: bool,
}

impl TerminalBackend {
    pub fn new(debug: bool) -> Self {
        Self {
            out: Mutex::new(std::io::stdout()),
            debug,
        }
    }
}

impl SinkBackend for TerminalBackend {
    fn trace_line(&self, line: &str) {
        let mut out = self.out.lock().expect("stdout lock poisoned");
        let _ = writeln!(out, "{line}");
    }

    fn event(&self, event: &SimEvent) {
        if !self.debug {
            return;
        }
        if let SimEvent::Statistics { report } = event {
            let mut out = self.out.lock().expect("stdout lock poisoned");
            let _ = writeln!(out, "{report:#?}");
        }
    }
}
