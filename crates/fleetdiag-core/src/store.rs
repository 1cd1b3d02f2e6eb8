//! Store: the owned list of [`LogEntry`](crate::LogEntry) values, mirrored to
//! a JSON file.
//!
//! The store is the single source of truth; the HTTP layer reads from it and
//! appends to it, never touching the file directly. The in-memory list and
//! the file are kept in step: a failed write rolls the list back.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::error::StoreError;
use crate::parser::clean_code;
use crate::timestamp;
use crate::types::{Level, LogEntry};

static LEGACY_VEHICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"VEHICLE_ID:(\d+)").expect("legacy vehicle pattern must compile"));

/// Summary of the store for `/db-info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub total_logs: usize,
    #[serde(with = "crate::timestamp::iso_millis")]
    pub last_updated: DateTime<Utc>,
    pub db_path: PathBuf,
}

/// On-disk document written by [`LogStore::save`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument<'a> {
    logs: &'a [LogEntry],
    #[serde(with = "crate::timestamp::iso_millis")]
    last_updated: DateTime<Utc>,
}

/// A record as found on disk, possibly written by an older version.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredRecord {
    timestamp: Option<String>,
    #[serde(alias = "vehicle_id")]
    vehicle_id: Option<serde_json::Value>,
    level: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

/// Outcome of repairing one stored record.
enum Repair {
    Kept(LogEntry),
    Repaired(LogEntry),
}

impl StoredRecord {
    /// Every record survives: a missing or unreadable timestamp falls back
    /// to now and missing text fields become empty.
    fn repair(self, classifier: &Classifier) -> Repair {
        let mut changed = self.code.is_none() || self.message.is_none();
        let raw_code = self.code.unwrap_or_default();
        let message = self.message.unwrap_or_default();

        let ts = match self.timestamp.as_deref() {
            Some(raw_ts) => {
                let ts = timestamp::normalize_timestamp(raw_ts);
                changed |= timestamp::to_iso(&ts) != raw_ts;
                ts
            }
            None => {
                changed = true;
                Utc::now()
            }
        };

        let raw_level = self.level.unwrap_or_default();

        let vehicle_id = match self.vehicle_id.as_ref().and_then(vehicle_id_from_json) {
            Some(id) => id,
            None => {
                changed = true;
                LEGACY_VEHICLE_RE
                    .captures(&raw_level)
                    .and_then(|caps| caps[1].parse().ok())
                    .unwrap_or(0)
            }
        };

        let code = clean_code(&raw_code);
        changed |= code != raw_code;

        let trimmed = message.trim().to_string();
        changed |= trimmed != message;

        // A legacy level token is discarded outright; a canonical one is kept.
        let level = match raw_level.parse::<Level>() {
            Ok(level) if !raw_level.contains("VEHICLE_ID:") => level,
            _ => classifier.classify(&code, &trimmed),
        };
        changed |= level.to_string() != raw_level;

        let entry = LogEntry { timestamp: ts, vehicle_id, level, code, message: trimmed };
        if changed {
            Repair::Repaired(entry)
        } else {
            Repair::Kept(entry)
        }
    }
}

fn vehicle_id_from_json(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// LogStore
// ---------------------------------------------------------------------------

/// Append-only list of entries persisted to one JSON file.
#[derive(Debug)]
pub struct LogStore {
    path: PathBuf,
    entries: Vec<LogEntry>,
    last_updated: DateTime<Utc>,
}

impl LogStore {
    /// Open (or create) the store at `path`, repairing legacy records with
    /// the given classifier.
    pub fn open(path: impl Into<PathBuf>, classifier: &Classifier) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if !path.exists() {
            tracing::info!(path = %path.display(), "no existing store file, starting empty");
            let mut store = Self::empty(path);
            store.save()?;
            return Ok(store);
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        if raw.trim().is_empty() {
            tracing::info!(path = %path.display(), "empty store file, starting empty");
            return Ok(Self::empty(path));
        }

        let (records, last_updated, bare_array) = read_records(&path, &raw)?;
        let mut entries = Vec::with_capacity(records.len());
        let mut repaired = 0usize;
        for record in records {
            match record.repair(classifier) {
                Repair::Kept(entry) => entries.push(entry),
                Repair::Repaired(entry) => {
                    repaired += 1;
                    entries.push(entry);
                }
            }
        }

        let mut store = Self {
            path,
            entries,
            last_updated: last_updated.unwrap_or_else(Utc::now),
        };
        tracing::info!(
            path = %store.path.display(),
            loaded = store.entries.len(),
            repaired,
            "loaded store"
        );
        if repaired > 0 || bare_array {
            store.save()?;
        }
        Ok(store)
    }

    fn empty(path: PathBuf) -> Self {
        Self { path, entries: Vec::new(), last_updated: Utc::now() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn info(&self) -> StoreInfo {
        StoreInfo {
            total_logs: self.entries.len(),
            last_updated: self.last_updated,
            db_path: self.path.clone(),
        }
    }

    /// Append `batch` and persist. On a failed write nothing is appended.
    pub fn append(&mut self, batch: Vec<LogEntry>) -> Result<usize, StoreError> {
        let added = batch.len();
        if added == 0 {
            return Ok(0);
        }
        let previous_len = self.entries.len();
        self.entries.extend(batch);
        if let Err(err) = self.save() {
            self.entries.truncate(previous_len);
            return Err(err);
        }
        tracing::info!(added, total = self.entries.len(), "appended entries");
        Ok(added)
    }

    /// Remove every entry and persist the empty store.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        let previous = std::mem::take(&mut self.entries);
        if let Err(err) = self.save() {
            self.entries = previous;
            return Err(err);
        }
        tracing::info!(removed = previous.len(), "cleared store");
        Ok(())
    }

    /// Write the whole store to its file.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let now = Utc::now();
        let doc = StoreDocument { logs: &self.entries, last_updated: now };
        let json = serde_json::to_string_pretty(&doc).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.last_updated = now;
        tracing::debug!(path = %self.path.display(), total = self.entries.len(), "saved store");
        Ok(())
    }
}

/// Accepts a bare record array or a `{ "logs": [...] }` document.
fn read_records(
    path: &Path,
    raw: &str,
) -> Result<(Vec<StoredRecord>, Option<DateTime<Utc>>, bool), StoreError> {
    let json_err = |source| StoreError::Json { path: path.to_path_buf(), source };
    let value: serde_json::Value = serde_json::from_str(raw).map_err(json_err)?;

    match value {
        serde_json::Value::Array(items) => {
            let records = items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<StoredRecord>, _>>()
                .map_err(json_err)?;
            Ok((records, None, true))
        }
        serde_json::Value::Object(mut doc) => {
            let Some(logs) = doc.remove("logs") else {
                return Err(StoreError::UnsupportedShape { path: path.to_path_buf() });
            };
            let records: Vec<StoredRecord> = serde_json::from_value(logs).map_err(json_err)?;
            let last_updated = doc
                .get("lastUpdated")
                .and_then(|v| v.as_str())
                .and_then(timestamp::parse_timestamp);
            Ok((records, last_updated, false))
        }
        _ => Err(StoreError::UnsupportedShape { path: path.to_path_buf() }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
