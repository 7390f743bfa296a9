//! SQLite trace sink (WAL journal), gated behind the `sqlite` feature.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, params};

use crate::core::errors::Result;
use crate::tracelog::event::{TraceEvent, TraceKind};
use crate::tracelog::sink::TraceSink;
use crate::tracelog::stats::{SinkStats, SinkStatsSnapshot};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS trace_events (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    at      TEXT NOT NULL,
    sentry  TEXT NOT NULL,
    event   TEXT NOT NULL,
    status  TEXT,
    details TEXT
)";

/// Trace sink inserting one row per event.
///
/// Connection setup fails fast; insert failures afterwards are absorbed and
/// counted as drops, matching the [`TraceSink`] contract.
pub struct SqliteSink {
    conn: Mutex<Connection>,
    stats: SinkStats,
}

impl SqliteSink {
    /// Open (creating if needed) the database at `path` in WAL mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::setup(Connection::open(path.as_ref())?)
    }

    /// Open an in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::setup(Connection::open_in_memory()?)
    }

    fn setup(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            stats: SinkStats::new(),
        })
    }

    /// Total rows recorded in the `trace_events` table.
    pub fn event_count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM trace_events", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> SinkStatsSnapshot {
        self.stats.snapshot()
    }
}

impl TraceSink for SqliteSink {
    fn record(&self, event: &TraceEvent) {
        let (status, details) = match &event.kind {
            TraceKind::Status { status } => (Some(status.as_str()), None),
            TraceKind::Error { details } => (None, Some(details.as_str())),
            _ => (None, None),
        };
        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT INTO trace_events (at, sentry, event, status, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.at.to_rfc3339(),
                event.sentry,
                event.kind.label(),
                status,
                details
            ],
        );
        if inserted.is_ok() {
            self.stats.count_recorded();
        } else {
            self.stats.count_dropped();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteSink;
    use crate::core::status::Status;
    use crate::tracelog::event::{TraceEvent, TraceKind};
    use crate::tracelog::sink::TraceSink;

    #[test]
    fn rows_accumulate_per_event() {
        let sink = SqliteSink::open_in_memory().expect("in-memory db should open");
        sink.record(&TraceEvent::now("db", TraceKind::Subscribed));
        sink.record(&TraceEvent::now(
            "db",
            TraceKind::Status {
                status: Status::Error,
            },
        ));
        assert_eq!(sink.event_count().expect("count should succeed"), 2);
        assert_eq!(sink.stats().recorded, 2);
        assert_eq!(sink.stats().dropped, 0);
    }
}
