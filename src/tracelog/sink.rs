//! The trace sink contract plus the in-process backends.

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::tracelog::event::TraceEvent;
use crate::tracelog::stats::{SinkStats, SinkStatsSnapshot};

/// Destination for trace events.
///
/// Recording is infallible by contract: a sink that cannot write an event
/// degrades gracefully and accounts for the drop instead of propagating the
/// failure into the sentry graph.
pub trait TraceSink: Send + Sync {
    /// Record one event.
    fn record(&self, event: &TraceEvent);
}

/// Buffering sink for tests and ad-hoc inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TraceEvent>>,
    stats: SinkStats,
}

impl MemorySink {
    /// Fresh empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }

    /// Drain the buffer.
    #[must_use]
    pub fn take(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded (or everything was drained).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> SinkStatsSnapshot {
        self.stats.snapshot()
    }
}

impl TraceSink for MemorySink {
    fn record(&self, event: &TraceEvent) {
        self.events.lock().push(event.clone());
        self.stats.count_recorded();
    }
}

/// Sink forwarding events over a crossbeam channel without ever blocking
/// the sentry graph. Events that do not fit the channel are dropped and
/// counted.
pub struct ChannelSink {
    tx: Sender<TraceEvent>,
    stats: SinkStats,
}

impl ChannelSink {
    /// Forward into `tx`; the caller owns the receiving side.
    #[must_use]
    pub fn new(tx: Sender<TraceEvent>) -> Self {
        Self {
            tx,
            stats: SinkStats::new(),
        }
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> SinkStatsSnapshot {
        self.stats.snapshot()
    }
}

impl TraceSink for ChannelSink {
    fn record(&self, event: &TraceEvent) {
        if self.tx.try_send(event.clone()).is_ok() {
            self.stats.count_recorded();
        } else {
            self.stats.count_dropped();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelSink, MemorySink, TraceSink};
    use crate::tracelog::event::{TraceEvent, TraceKind};

    #[test]
    fn memory_sink_buffers_in_order() {
        let sink = MemorySink::new();
        sink.record(&TraceEvent::now("a", TraceKind::Subscribed));
        sink.record(&TraceEvent::now("a", TraceKind::Completed));
        let events = sink.take();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, TraceKind::Subscribed);
        assert_eq!(events[1].kind, TraceKind::Completed);
        assert!(sink.is_empty());
        assert_eq!(sink.stats().recorded, 2);
    }

    #[test]
    fn channel_sink_counts_overflow_as_dropped() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let sink = ChannelSink::new(tx);
        sink.record(&TraceEvent::now("a", TraceKind::Subscribed));
        sink.record(&TraceEvent::now("a", TraceKind::Unsubscribed));
        let snap = sink.stats();
        assert_eq!(snap.recorded, 1);
        assert_eq!(snap.dropped, 1);
        assert_eq!(rx.len(), 1);
    }
}
