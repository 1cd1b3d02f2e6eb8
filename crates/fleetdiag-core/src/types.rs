//! Core types for fleetdiag-core.
//!
//! This module defines the data structures shared across all layers: the
//! canonical [`LogEntry`], its [`Level`], and the [`IngestBatch`] produced by
//! the ingestor.

use serde::{Deserialize, Serialize};

/// A classified diagnostic record, as stored and served.
///
/// Entries are immutable once built. The only way to construct one outside
/// of tests is [`ParsedLine::into_entry`](crate::parser::ParsedLine::into_entry),
/// which requires a canonical [`Level`] from the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Normalised UTC timestamp. Serialised as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    #[serde(with = "crate::timestamp::iso_millis")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Vehicle identifier. `0` means unknown.
    pub vehicle_id: u64,
    /// Severity derived by the classifier.
    pub level: Level,
    /// Diagnostic trouble code, uppercase, without a `CODE:` prefix.
    pub code: String,
    /// Trimmed free-text description.
    pub message: String,
}

impl LogEntry {
    /// The message with one surrounding `[...]` pair removed, for display.
    pub fn display_message(&self) -> &str {
        let msg = self.message.as_str();
        msg.strip_prefix('[')
            .and_then(|m| m.strip_suffix(']'))
            .map(str::trim)
            .unwrap_or(msg)
    }
}

/// Canonical severity, ordered `Debug < Info < Warning < Error`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    #[serde(alias = "WARN")]
    Warning,
    Error,
}

impl Level {
    /// All levels, most severe first.
    pub const ALL: [Level; 4] = [Level::Error, Level::Warning, Level::Info, Level::Debug];
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "DEBUG"),
            Level::Info => write!(f, "INFO"),
            Level::Warning => write!(f, "WARNING"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

/// Returned when a string is not one of the canonical level names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised level {0:?}")]
pub struct ParseLevelError(pub String);

impl std::str::FromStr for Level {
    type Err = ParseLevelError;

    /// Case-insensitive; tolerates surrounding brackets and whitespace, and
    /// accepts `WARN` as an alias for `WARNING`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().trim_start_matches('[').trim_end_matches(']').trim();
        match cleaned.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Output of one ingestion call: the accepted entries in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestBatch {
    pub accepted: Vec<LogEntry>,
    pub count: usize,
}

impl IngestBatch {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: chrono::Utc.with_ymd_and_hms(2025, 7, 24, 14, 21, 8).unwrap(),
            vehicle_id: 1234,
            level: Level::Error,
            code: "U0420".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn level_parses_aliases_and_brackets() {
        assert_eq!("warn".parse::<Level>(), Ok(Level::Warning));
        assert_eq!(" [Error] ".parse::<Level>(), Ok(Level::Error));
        assert!("VEHICLE_ID:12".parse::<Level>().is_err());
    }

    #[test]
    fn level_ordering() {
        assert!(Level::Error > Level::Warning);
        assert!(Level::Info > Level::Debug);
    }

    #[test]
    fn entry_serialises_camel_case_with_millis() {
        let json = serde_json::to_value(entry("Steering angle sensor malfunction")).unwrap();
        assert_eq!(json["timestamp"], "2025-07-24T14:21:08.000Z");
        assert_eq!(json["vehicleId"], 1234);
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "U0420");
    }

    #[test]
    fn display_message_strips_one_bracket_pair() {
        assert_eq!(entry("[Oil pressure low]").display_message(), "Oil pressure low");
        assert_eq!(entry("Oil pressure low").display_message(), "Oil pressure low");
    }
}
