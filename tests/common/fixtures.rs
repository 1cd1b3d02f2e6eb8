//! Static log corpora and store files used across harnesses.

use std::path::{Path, PathBuf};

/// Well-formed lines in the canonical grammar.
pub const CORPUS_VALID: &[&str] = &[
    "[2025-07-24 14:21:08] [VEHICLE_ID:1234] [ERROR] [CODE:U0420] [Steering angle sensor malfunction]",
    "[2025-07-24 14:22:10] [VEHICLE_ID:1234] [INFO] [CODE:P0300] [Engine misfire detected]",
    "[2025-07-24T14:23:00Z] [VEHICLE_ID:77] [WARN] [CODE:P0420] [Catalyst efficiency below threshold]",
    "[2025-07-24T16:24:00+02:00] [VEHICLE_ID:77] [DEBUG] [CODE:B0001] [status normal]",
    "[07/24/2025 14:25:00] [VEHICLE_ID:5] [INFO] [CODE:C0102] [ABS pump]",
];

/// Lines that do not match the grammar and must be skipped.
pub const CORPUS_MALFORMED: &[&str] = &[
    "random text",
    "[2025-07-24 14:21:08] [VEHICLE_ID:abc] [INFO] [CODE:P0300] [bad vehicle id]",
    "[2025-07-24 14:21:08] [VEHICLE:1] [INFO] [CODE:P0300] [wrong tag]",
    "[2025-07-24 14:21:08] [VEHICLE_ID:1] [INFO] [P0300] [missing code tag]",
    "[2025-07-24 14:21:08] [VEHICLE_ID:1] [INFO] [CODE:P0300]",
    "[2025-07-24 14:21:08]\t[VEHICLE_ID:1]\t[INFO]\t[CODE:P0300]\t[tabs]",
];

/// A store file written by an older version: bare array, legacy level
/// tokens with the vehicle id folded in, `CODE:` prefixes, and one record
/// with an unreadable timestamp.
pub const LEGACY_STORE: &str = r#"[
  {
    "timestamp": "2025-07-24T14:21:08.000Z",
    "level": "VEHICLE_ID:1234",
    "code": "CODE:P0300",
    "message": "Engine misfire detected"
  },
  {
    "timestamp": "2025-07-24T14:22:08.000Z",
    "vehicleId": 77,
    "level": "INFO",
    "code": "P0420",
    "message": "  Catalyst efficiency low  "
  },
  {
    "timestamp": "not a date",
    "vehicleId": 1,
    "level": "INFO",
    "code": "P0001",
    "message": "unreadable timestamp"
  }
]"#;

/// Write `contents` to `name` inside `dir` and return the path.
pub fn write_store_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write store fixture");
    path
}

/// The valid corpus joined into one upload body.
pub fn valid_upload() -> String {
    CORPUS_VALID.join("\n")
}
