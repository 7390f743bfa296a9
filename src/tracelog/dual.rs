//! Dual-write trace sink: fan out every event to two backends.

use std::sync::Arc;

use crate::tracelog::event::TraceEvent;
use crate::tracelog::sink::TraceSink;

/// Fan-out sink writing each event to both backends.
///
/// Each backend degrades independently (per the [`TraceSink`] contract), so
/// one failing half never starves the other — the usual pairing is a
/// durable file or database sink plus a live channel sink.
pub struct DualSink {
    primary: Arc<dyn TraceSink>,
    secondary: Arc<dyn TraceSink>,
}

impl DualSink {
    /// Pair two sinks.
    #[must_use]
    pub fn new(primary: Arc<dyn TraceSink>, secondary: Arc<dyn TraceSink>) -> Self {
        Self { primary, secondary }
    }
}

impl TraceSink for DualSink {
    fn record(&self, event: &TraceEvent) {
        self.primary.record(event);
        self.secondary.record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::DualSink;
    use crate::tracelog::event::{TraceEvent, TraceKind};
    use crate::tracelog::sink::{MemorySink, TraceSink};
    use std::sync::Arc;

    #[test]
    fn both_halves_receive_every_event() {
        let left = Arc::new(MemorySink::new());
        let right = Arc::new(MemorySink::new());
        let dual = DualSink::new(
            Arc::clone(&left) as Arc<dyn TraceSink>,
            Arc::clone(&right) as Arc<dyn TraceSink>,
        );
        dual.record(&TraceEvent::now("db", TraceKind::Subscribed));
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 1);
    }
}
