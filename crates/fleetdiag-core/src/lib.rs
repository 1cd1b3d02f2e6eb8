//! fleetdiag-core: vehicle diagnostic log ingestion and triage.
//!
//! This crate exposes the pipeline layers as public modules, plus the shared
//! types used across all of them.
//!
//! # Architecture
//!
//! ```text
//! text ──► Parser ──► Classifier ──► Ingestor ──► Store ──► Search / Stats
//!            │
//!            └──► Timestamp normalizer
//! ```
//!
//! Parsing, classification, and ingestion are synchronous and pure. The
//! store owns all mutable state; callers that share it across tasks must
//! serialise writes themselves.

pub mod classifier;
pub mod config;
pub mod error;
pub mod ingest;
pub mod parser;
pub mod search;
pub mod stats;
pub mod store;
pub mod timestamp;
pub mod types;

pub use classifier::{classify, Classification, Classifier};
pub use error::{CoreError, StoreError};
pub use ingest::{ingest, Ingestor};
pub use parser::{parse_line, LineParser, ParsedLine};
pub use search::SearchQuery;
pub use stats::{LevelCounts, VehicleStats};
pub use store::{LogStore, StoreInfo};
pub use types::{IngestBatch, Level, LogEntry};
