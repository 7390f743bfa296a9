//! Pattern-table classification for textual events: ordered regex rules
//! mapping matched text to a status, loadable from a TOML rule table.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SentryError};
use crate::core::status::Status;
use crate::sentries::classify::Classifier;

/// One declarative rule: a regex and the status it classifies to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    /// Regex matched against the event text (unanchored).
    pub pattern: String,
    /// Status reported when the pattern matches.
    pub status: Status,
}

/// Declarative rule table, typically deserialized from TOML:
///
/// ```toml
/// [[rules]]
/// pattern = "(?i)fatal|panic"
/// status = "error"
///
/// [[rules]]
/// pattern = "(?i)timeout|retry"
/// status = "warning"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternTable {
    /// Rules in evaluation order.
    pub rules: Vec<PatternRule>,
}

/// Compiled ordered pattern classifier. First matching rule wins; text no
/// rule matches classifies to `Status::None`, which lets the chain's
/// fail-safe handling decide.
#[derive(Debug)]
pub struct PatternClassifier {
    rules: Vec<(Regex, Status)>,
}

impl PatternClassifier {
    /// Compile rules from `(pattern, status)` pairs, in order.
    pub fn new<S: AsRef<str>>(rules: impl IntoIterator<Item = (S, Status)>) -> Result<Self> {
        let mut compiled = Vec::new();
        for (pattern, status) in rules {
            let pattern = pattern.as_ref();
            let regex = Regex::new(pattern).map_err(|err| SentryError::PatternParse {
                pattern: pattern.to_string(),
                details: err.to_string(),
            })?;
            compiled.push((regex, status));
        }
        Ok(Self { rules: compiled })
    }

    /// Compile a declarative rule table.
    pub fn from_table(table: &PatternTable) -> Result<Self> {
        Self::new(
            table
                .rules
                .iter()
                .map(|rule| (rule.pattern.as_str(), rule.status)),
        )
    }

    /// Parse a TOML rule table and compile it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: PatternTable = toml::from_str(text)?;
        Self::from_table(&table)
    }

    /// Number of compiled rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules (everything classifies to `None`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Classify one line of text. First matching rule wins.
    #[must_use]
    pub fn classify(&self, text: &str) -> Status {
        for (regex, status) in &self.rules {
            if regex.is_match(text) {
                return *status;
            }
        }
        Status::None
    }

    /// Consume the table into a chain link for a classifying sentry over
    /// `String` events.
    #[must_use]
    pub fn into_classifier(self) -> Classifier<String> {
        Box::new(move |text: &String| self.classify(text))
    }
}

#[cfg(test)]
mod tests {
    use super::PatternClassifier;
    use crate::core::status::Status;

    #[test]
    fn first_matching_rule_wins() {
        let table = PatternClassifier::new([
            ("(?i)fatal", Status::Error),
            ("(?i)fatal|slow", Status::Warning),
        ])
        .expect("patterns should compile");
        assert_eq!(table.classify("FATAL: disk gone"), Status::Error);
        assert_eq!(table.classify("slow response"), Status::Warning);
        assert_eq!(table.classify("all quiet"), Status::None);
    }

    #[test]
    fn invalid_regex_is_rejected_with_code() {
        let err = PatternClassifier::new([("(unclosed", Status::Error)])
            .expect_err("invalid regex should fail");
        assert_eq!(err.code(), "SEN-1002");
    }

    #[test]
    fn toml_table_round_trips() {
        let table = PatternClassifier::from_toml_str(
            r#"
            [[rules]]
            pattern = "(?i)panic"
            status = "error"

            [[rules]]
            pattern = "(?i)degraded"
            status = "warning"

            [[rules]]
            pattern = "(?i)ok"
            status = "success"
            "#,
        )
        .expect("table should parse and compile");
        assert_eq!(table.len(), 3);
        assert_eq!(table.classify("panic: poisoned"), Status::Error);
        assert_eq!(table.classify("service degraded"), Status::Warning);
        assert_eq!(table.classify("ok"), Status::Success);
    }

    #[test]
    fn invalid_toml_is_rejected_with_code() {
        let err =
            PatternClassifier::from_toml_str("rules = 3").expect_err("bad config should fail");
        assert_eq!(err.code(), "SEN-1003");
    }
}
