//! The reported health value and its severity ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Health status reported by a sentry.
///
/// The derived ordering (`None < Success < Warning < Error`) is a severity
/// scale consumed by aggregation policies. The subscription engine itself
/// never relies on it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No status reported yet, or the sentry has no observers.
    #[default]
    None,
    /// The monitored concern is healthy.
    Success,
    /// The monitored concern is degraded but operating.
    Warning,
    /// The monitored concern is failing.
    Error,
}

impl Status {
    /// Stable lowercase label, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Whether this is a reported value rather than the dormant default.
    #[must_use]
    pub const fn is_reported(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn severity_order_is_none_success_warning_error() {
        assert!(Status::None < Status::Success);
        assert!(Status::Success < Status::Warning);
        assert!(Status::Warning < Status::Error);
    }

    #[test]
    fn default_is_none() {
        assert_eq!(Status::default(), Status::None);
    }

    #[test]
    fn serde_round_trip_uses_snake_case() {
        let json = serde_json::to_string(&Status::Warning).expect("serialize should succeed");
        assert_eq!(json, "\"warning\"");
        let back: Status = serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(back, Status::Warning);
    }

    #[test]
    fn display_matches_as_str() {
        for status in [
            Status::None,
            Status::Success,
            Status::Warning,
            Status::Error,
        ] {
            assert_eq!(status.to_string(), status.as_str());
        }
    }
}
