//! Domain-specific assertion macros for fleetdiag harnesses.
//!
//! These add context to failure messages so it is clear which entry or
//! result set broke the expectation.

// ---------------------------------------------------------------------------
// Entry assertions
// ---------------------------------------------------------------------------

/// Assert that a `LogEntry` has a specific level.
///
/// ```rust
/// assert_level!(entry, Level::Error);
/// ```
#[macro_export]
macro_rules! assert_level {
    ($entry:expr, $level:expr) => {{
        let entry: &fleetdiag::LogEntry = &$entry;
        let expected: fleetdiag::Level = $level;
        if entry.level != expected {
            panic!(
                "assert_level! failed:\n  expected: {:?}\n  actual:   {:?}\n  code: {:?}\n  message: {:?}",
                expected, entry.level, entry.code, entry.message
            );
        }
    }};
}

/// Assert the vehicle id and code of an entry in one go.
#[macro_export]
macro_rules! assert_entry {
    ($entry:expr, vehicle = $vehicle:expr, code = $code:expr) => {{
        let entry: &fleetdiag::LogEntry = &$entry;
        let vehicle: u64 = $vehicle;
        let code: &str = $code;
        if entry.vehicle_id != vehicle || entry.code != code {
            panic!(
                "assert_entry! failed:\n  expected: vehicle {} code {:?}\n  actual:   vehicle {} code {:?}",
                vehicle, code, entry.vehicle_id, entry.code
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Result set assertions
// ---------------------------------------------------------------------------

/// Assert that every entry in a result set (`Vec<&LogEntry>`) satisfies a
/// predicate.
///
/// ```rust
/// assert_results_all!(results, |e: &LogEntry| e.vehicle_id == 7);
/// ```
#[macro_export]
macro_rules! assert_results_all {
    ($results:expr, $pred:expr) => {{
        let results: Vec<&fleetdiag::LogEntry> = $results.iter().map(|e| &**e).collect();
        let pred: &dyn Fn(&fleetdiag::LogEntry) -> bool = &$pred;
        let failing: Vec<&fleetdiag::LogEntry> =
            results.iter().copied().filter(|e| !pred(*e)).collect();
        if !failing.is_empty() {
            panic!(
                "assert_results_all! failed: {} of {} entries did not satisfy predicate.\n  first: {:?}",
                failing.len(),
                results.len(),
                failing[0]
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Envelope helpers
// ---------------------------------------------------------------------------

/// Assert the common shape of a successful API envelope.
pub fn assert_success(json: &serde_json::Value) {
    assert_eq!(json["success"], true, "expected success envelope, got {json}");
    assert!(json["message"].is_string(), "envelope without message: {json}");
}

/// Assert the common shape of an error envelope.
pub fn assert_failure(json: &serde_json::Value) {
    assert_eq!(json["success"], false, "expected failure envelope, got {json}");
    assert!(json["error"].is_string(), "error envelope without error: {json}");
}
