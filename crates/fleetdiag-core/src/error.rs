//! Error types for fleetdiag-core.
//!
//! Parsing, classification, and ingestion never fail; only building a
//! classifier from config and touching the store file can.

use std::path::PathBuf;

/// Failure to build a component from configuration.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid keyword rule for {level}: {source}")]
    InvalidKeywordRule {
        level: crate::Level,
        #[source]
        source: regex::Error,
    },
}

/// Failure reading or writing the store file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path:?} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store file {path:?} holds neither a record array nor a {{\"logs\": [...]}} document")]
    UnsupportedShape { path: PathBuf },
}
