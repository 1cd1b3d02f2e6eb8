//! fleetdiag: fleet diagnostics
//!
//! Ingests bracketed vehicle diagnostic log lines, classifies each by trouble
//! code and message, persists them to a JSON store, and answers search and
//! per-vehicle statistics queries over HTTP. The core crate is
//! re-exported at the root and the HTTP layer as [`api`], so integration
//! tests and benches import everything through one path.
//!
//! # Architecture
//!
//! ```text
//! upload / webhook / CLI ──► Ingestor ──► LogStore ──► Search / Stats
//!                              │
//!                  Parser ─────┴───── Classifier
//! ```

pub use fleetdiag_api as api;
pub use fleetdiag_core::*;
