//! Search: filters stored entries by vehicle, code, level, and time range.

use chrono::{DateTime, Utc};

use crate::types::{Level, LogEntry};

/// All filters are optional and combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub vehicle: Option<u64>,
    /// Case-insensitive substring of the code.
    pub code: Option<String>,
    pub level: Option<Level>,
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub to: Option<DateTime<Utc>>,
}

impl SearchQuery {
    pub fn vehicle(mut self, id: u64) -> Self {
        self.vehicle = Some(id);
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn since(mut self, ts: DateTime<Utc>) -> Self {
        self.from = Some(ts);
        self
    }

    pub fn until(mut self, ts: DateTime<Utc>) -> Self {
        self.to = Some(ts);
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.vehicle.is_some_and(|id| entry.vehicle_id != id) {
            return false;
        }
        if let Some(code) = &self.code {
            if !entry.code.to_lowercase().contains(&code.to_lowercase()) {
                return false;
            }
        }
        if self.level.is_some_and(|level| entry.level != level) {
            return false;
        }
        if self.from.is_some_and(|from| entry.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| entry.timestamp > to) {
            return false;
        }
        true
    }
}

/// Entries matching `query`, in store order.
pub fn search<'a>(entries: &'a [LogEntry], query: &SearchQuery) -> Vec<&'a LogEntry> {
    entries.iter().filter(|e| query.matches(e)).collect()
}

/// All entries, latest timestamp first. Equal timestamps keep store order.
pub fn newest_first(entries: &[LogEntry]) -> Vec<&LogEntry> {
    let mut sorted: Vec<&LogEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}
