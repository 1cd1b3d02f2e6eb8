//! Line parser: matches one bracketed diagnostic line.
//!
//! Grammar (anchored, order-sensitive, groups separated by one or more
//! spaces):
//!
//! ```text
//! [<timestamp>] [VEHICLE_ID:<digits>] [<level-token>] [CODE:<code>] [<message>]
//! ```
//!
//! A line that deviates yields `None`. That is not an error: the ingestor
//! skips the line and carries on.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::config::TimestampPolicy;
use crate::timestamp;
use crate::types::{Level, LogEntry};

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[([^\]]+)\] +\[VEHICLE_ID:(\d+)\] +\[([^\]]+)\] +\[CODE:([^\]]+)\] +\[([^\]]+)\]$",
    )
    .expect("line grammar must compile")
});

const CODE_PREFIX: &str = "CODE:";
const LEGACY_LEVEL_MARKER: &str = "VEHICLE_ID:";

/// A grammatically valid line, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub timestamp: DateTime<Utc>,
    pub vehicle_id: u64,
    /// The raw level group, trimmed and uppercased. Informational only.
    pub level_token: String,
    /// Uppercase, without any `CODE:` prefix.
    pub code: String,
    pub message: String,
}

impl ParsedLine {
    /// True when the level group carries an embedded vehicle id, the shape
    /// written by the old log format.
    pub fn has_legacy_level(&self) -> bool {
        self.level_token.contains(LEGACY_LEVEL_MARKER)
    }

    /// Attach the classified level, producing a storable entry.
    pub fn into_entry(self, level: Level) -> LogEntry {
        LogEntry {
            timestamp: self.timestamp,
            vehicle_id: self.vehicle_id,
            level,
            code: self.code,
            message: self.message,
        }
    }
}

/// Strip any number of leading `CODE:` prefixes, trim, and uppercase.
pub fn clean_code(raw: &str) -> String {
    let mut code = raw.trim();
    while code
        .get(..CODE_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(CODE_PREFIX))
    {
        code = code[CODE_PREFIX.len()..].trim_start();
    }
    code.to_ascii_uppercase()
}

/// Parses lines under a fixed [`TimestampPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LineParser {
    policy: TimestampPolicy,
}

impl LineParser {
    pub fn new(policy: TimestampPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TimestampPolicy {
        self.policy
    }

    /// Match `line` against the grammar.
    pub fn parse(&self, line: &str) -> Option<ParsedLine> {
        let caps = LINE_RE.captures(line.trim())?;

        let raw_ts = &caps[1];
        let timestamp = match self.policy {
            TimestampPolicy::FallbackToNow => timestamp::normalize_timestamp(raw_ts),
            TimestampPolicy::Reject => match timestamp::parse_timestamp(raw_ts) {
                Some(ts) => ts,
                None => {
                    tracing::debug!(timestamp = raw_ts, "rejecting line with unparsable timestamp");
                    return None;
                }
            },
        };

        // Digits only, but may still overflow.
        let vehicle_id = caps[2].parse::<u64>().ok()?;

        Some(ParsedLine {
            timestamp,
            vehicle_id,
            level_token: caps[3].trim().to_ascii_uppercase(),
            code: clean_code(&caps[4]),
            message: caps[5].trim().to_string(),
        })
    }
}

/// Parse with the default policy (fall back to the current time).
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    LineParser::default().parse(line)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
