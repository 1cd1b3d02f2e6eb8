//! Test builders: ergonomic constructors for `LogEntry` values and raw
//! diagnostic lines.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use fleetdiag::timestamp::parse_timestamp;
use fleetdiag::{Level, LogEntry};

// ---------------------------------------------------------------------------
// LogEntryBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`LogEntry`] test fixtures.
///
/// # Example
///
/// ```rust
/// let entry = LogEntryBuilder::new("P0300")
///     .vehicle(1234)
///     .level(Level::Error)
///     .at("2025-07-24 14:21:08")
///     .build();
/// ```
pub struct LogEntryBuilder {
    timestamp: chrono::DateTime<chrono::Utc>,
    vehicle_id: u64,
    level: Level,
    code: String,
    message: String,
}

impl LogEntryBuilder {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            vehicle_id: 1,
            level: Level::Info,
            code: code.into(),
            message: "test message".to_string(),
        }
    }

    pub fn vehicle(mut self, vehicle_id: u64) -> Self {
        self.vehicle_id = vehicle_id;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the timestamp from any accepted timestamp form.
    pub fn at(mut self, raw: &str) -> Self {
        self.timestamp = parse_timestamp(raw).unwrap_or_else(|| panic!("bad test timestamp {raw:?}"));
        self
    }

    pub fn build(self) -> LogEntry {
        LogEntry {
            timestamp: self.timestamp,
            vehicle_id: self.vehicle_id,
            level: self.level,
            code: self.code,
            message: self.message,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw line builder
// ---------------------------------------------------------------------------

/// Render one bracketed diagnostic line.
///
/// ```rust
/// let line = diag_line("2025-07-24 14:21:08", 1234, "ERROR", "U0420", "Steering angle sensor");
/// ```
pub fn diag_line(ts: &str, vehicle: u64, level: &str, code: &str, message: &str) -> String {
    format!("[{ts}] [VEHICLE_ID:{vehicle}] [{level}] [CODE:{code}] [{message}]")
}

/// Build `n` lines cycling through a few vehicles and codes, one minute apart.
pub fn build_lines(n: usize) -> Vec<String> {
    const CODES: &[(&str, &str)] = &[
        ("P0300", "Engine misfire detected"),
        ("P0420", "Catalyst efficiency below threshold"),
        ("U0420", "Steering angle sensor malfunction"),
        ("B0001", "status normal"),
        ("C1001", "ABS pump fault"),
    ];
    (0..n)
        .map(|i| {
            let (code, message) = CODES[i % CODES.len()];
            let ts = format!("2025-07-24 {:02}:{:02}:00", (i / 60) % 24, i % 60);
            diag_line(&ts, 1000 + (i % 4) as u64, "INFO", code, message)
        })
        .collect()
}
