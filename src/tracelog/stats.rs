//! Drop accounting shared by all trace sinks.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for one sink: how many events were written and how many
/// were dropped because the backend was unavailable or full.
#[derive(Debug, Default)]
pub struct SinkStats {
    recorded: AtomicU64,
    dropped: AtomicU64,
}

impl SinkStats {
    /// Fresh zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one successfully written event.
    pub fn count_recorded(&self) {
        self.recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one event the sink could not write.
    pub fn count_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent-enough point-in-time view of the counters.
    #[must_use]
    pub fn snapshot(&self) -> SinkStatsSnapshot {
        SinkStatsSnapshot {
            recorded: self.recorded.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a sink's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkStatsSnapshot {
    /// Events written to the backend.
    pub recorded: u64,
    /// Events dropped (backend error or full buffer).
    pub dropped: u64,
}
