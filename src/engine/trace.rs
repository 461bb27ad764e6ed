//! Optional trace sink for conversation diagnostics.

use std::sync::Mutex;

use chrono::Utc;

/// A text sink receiving one timestamped line per engine event.
///
/// Delivery is best-effort: `record` cannot fail and must not block the
/// loop. When no sink is configured, tracing via the `tracing` crate is
/// the only diagnostic output.
pub trait TraceSink: Send + Sync {
    fn record(&self, line: &str);
}

/// Format an event line with a UTC timestamp.
pub(crate) fn trace_line(sink: &dyn TraceSink, event: &str) {
    sink.record(&format!("{} {event}", Utc::now().to_rfc3339()));
}

/// In-memory sink, mainly useful in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("sink lock poisoned").clone()
    }
}

impl TraceSink for MemorySink {
    fn record(&self, line: &str) {
        self.lines.lock().expect("sink lock poisoned").push(line.to_string());
    }
}
