//! SEN-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the crate.
pub type Result<T> = std::result::Result<T, SentryError>;

/// Top-level error type for the sentry framework.
#[derive(Debug, Error)]
pub enum SentryError {
    #[error("[SEN-1001] invalid sentry name: {details}")]
    InvalidName { details: String },

    #[error("[SEN-1002] pattern parse failure for `{pattern}`: {details}")]
    PatternParse { pattern: String, details: String },

    #[error("[SEN-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SEN-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[cfg(feature = "sqlite")]
    #[error("[SEN-2102] SQL failure in {context}: {details}")]
    Sql {
        context: &'static str,
        details: String,
    },

    #[error("[SEN-3001] upstream failure in {source_name}: {details}")]
    Upstream {
        source_name: String,
        details: String,
    },

    #[error("[SEN-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SEN-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[SEN-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl SentryError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "SEN-1001",
            Self::PatternParse { .. } => "SEN-1002",
            Self::ConfigParse { .. } => "SEN-1003",
            Self::Serialization { .. } => "SEN-2101",
            #[cfg(feature = "sqlite")]
            Self::Sql { .. } => "SEN-2102",
            Self::Upstream { .. } => "SEN-3001",
            Self::Io { .. } => "SEN-3002",
            Self::ChannelClosed { .. } => "SEN-3003",
            Self::Runtime { .. } => "SEN-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Io { .. }
            | Self::ChannelClosed { .. }
            | Self::Upstream { .. }
            | Self::Runtime { .. } => true,
            #[cfg(feature = "sqlite")]
            Self::Sql { .. } => true,
            _ => false,
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for upstream producer failures.
    #[must_use]
    pub fn upstream(source_name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for SentryError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for SentryError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<regex::Error> for SentryError {
    fn from(value: regex::Error) -> Self {
        Self::PatternParse {
            pattern: String::new(),
            details: value.to_string(),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for SentryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql {
            context: "rusqlite",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SentryError;

    #[test]
    fn codes_are_stable() {
        let err = SentryError::InvalidName {
            details: "blank".to_string(),
        };
        assert_eq!(err.code(), "SEN-1001");
        assert!(err.to_string().starts_with("[SEN-1001]"));
    }

    #[test]
    fn upstream_errors_are_retryable() {
        assert!(SentryError::upstream("feed", "socket reset").is_retryable());
        assert!(
            !SentryError::InvalidName {
                details: "blank".to_string()
            }
            .is_retryable()
        );
    }
}
