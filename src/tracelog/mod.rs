//! Trace sinks: structured trace events with JSONL, SQLite (feature
//! `sqlite`), channel, memory, and dual-write backends, all degrading
//! gracefully with drop accounting.

pub mod dual;
pub mod event;
pub mod jsonl;
pub mod sink;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod stats;
