//! Structured trace events emitted by the tracing decorator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::status::Status;

/// What happened on the traced sentry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceKind {
    /// First external observer attached; the tracer is now watching.
    Subscribed,
    /// Last external observer released; the tracer detached.
    Unsubscribed,
    /// The traced sentry published a status transition.
    Status {
        /// The newly published status.
        status: Status,
    },
    /// The traced sentry completed.
    Completed,
    /// The traced sentry failed.
    Error {
        /// Rendered error message.
        details: String,
    },
}

impl TraceKind {
    /// Stable label for the event kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Subscribed => "subscribed",
            Self::Unsubscribed => "unsubscribed",
            Self::Status { .. } => "status",
            Self::Completed => "completed",
            Self::Error { .. } => "error",
        }
    }
}

/// One timestamped trace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// When the event was observed.
    pub at: DateTime<Utc>,
    /// Display name of the traced sentry.
    pub sentry: String,
    /// What happened.
    #[serde(flatten)]
    pub kind: TraceKind,
}

impl TraceEvent {
    /// Stamp an event with the current wall clock.
    #[must_use]
    pub fn now(sentry: &str, kind: TraceKind) -> Self {
        Self {
            at: Utc::now(),
            sentry: sentry.to_string(),
            kind,
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sentry={} event={}",
            self.at.to_rfc3339(),
            self.sentry,
            self.kind.label()
        )?;
        match &self.kind {
            TraceKind::Status { status } => write!(f, " status={status}"),
            TraceKind::Error { details } => write!(f, " details={details}"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TraceEvent, TraceKind};
    use crate::core::status::Status;

    #[test]
    fn json_round_trip_keeps_kind_payload() {
        let event = TraceEvent::now(
            "db",
            TraceKind::Status {
                status: Status::Warning,
            },
        );
        let json = serde_json::to_string(&event).expect("serialize should succeed");
        assert!(json.contains("\"event\":\"status\""));
        assert!(json.contains("\"status\":\"warning\""));
        let back: TraceEvent = serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(back, event);
    }

    #[test]
    fn display_renders_one_line() {
        let event = TraceEvent::now("db", TraceKind::Subscribed);
        let line = event.to_string();
        assert!(line.contains("sentry=db"));
        assert!(line.contains("event=subscribed"));
        assert!(!line.contains('\n'));
    }
}
