//! Append-only JSONL trace sink.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::core::errors::{Result, SentryError};
use crate::tracelog::event::TraceEvent;
use crate::tracelog::sink::TraceSink;
use crate::tracelog::stats::{SinkStats, SinkStatsSnapshot};

/// Trace sink appending one JSON object per line to a file.
///
/// Opening the file fails fast; individual write failures afterwards are
/// absorbed and counted as drops so a full or revoked disk never takes the
/// sentry graph down with it.
pub struct JsonlSink {
    path: PathBuf,
    file: Mutex<File>,
    stats: SinkStats,
}

impl JsonlSink {
    /// Open (creating if needed) the JSONL file at `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| SentryError::io(&path, err))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
            stats: SinkStats::new(),
        })
    }

    /// Where the sink writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> SinkStatsSnapshot {
        self.stats.snapshot()
    }
}

impl TraceSink for JsonlSink {
    fn record(&self, event: &TraceEvent) {
        let Ok(line) = serde_json::to_string(event) else {
            self.stats.count_dropped();
            return;
        };
        let mut file = self.file.lock();
        if writeln!(file, "{line}").is_ok() {
            self.stats.count_recorded();
        } else {
            self.stats.count_dropped();
        }
    }
}
