//! Stats: per-vehicle aggregates over stored entries.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::types::{Level, LogEntry};

/// Entry counts by level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCounts {
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub debug_count: usize,
}

impl LevelCounts {
    pub fn record(&mut self, level: Level) {
        match level {
            Level::Error => self.error_count += 1,
            Level::Warning => self.warning_count += 1,
            Level::Info => self.info_count += 1,
            Level::Debug => self.debug_count += 1,
        }
    }

    pub fn get(&self, level: Level) -> usize {
        match level {
            Level::Error => self.error_count,
            Level::Warning => self.warning_count,
            Level::Info => self.info_count,
            Level::Debug => self.debug_count,
        }
    }
}

/// Aggregate view of one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleStats {
    pub vehicle_id: u64,
    pub total_logs: usize,
    #[serde(flatten)]
    pub counts: LevelCounts,
    /// Latest entry by timestamp; on ties the later-stored one.
    pub most_recent: Option<LogEntry>,
}

impl VehicleStats {
    fn new(vehicle_id: u64) -> Self {
        Self { vehicle_id, total_logs: 0, counts: LevelCounts::default(), most_recent: None }
    }

    fn record(&mut self, entry: &LogEntry) {
        self.total_logs += 1;
        self.counts.record(entry.level);
        let newer = self
            .most_recent
            .as_ref()
            .is_none_or(|current| entry.timestamp >= current.timestamp);
        if newer {
            self.most_recent = Some(entry.clone());
        }
    }
}

/// Stats for `vehicle_id`; all zero when it has no entries.
pub fn vehicle_stats(entries: &[LogEntry], vehicle_id: u64) -> VehicleStats {
    let mut stats = VehicleStats::new(vehicle_id);
    for entry in entries.iter().filter(|e| e.vehicle_id == vehicle_id) {
        stats.record(entry);
    }
    stats
}

/// Distinct vehicle ids, ascending.
pub fn unique_vehicles(entries: &[LogEntry]) -> Vec<u64> {
    entries
        .iter()
        .map(|e| e.vehicle_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One [`VehicleStats`] per vehicle, ascending by id.
pub fn fleet_summary(entries: &[LogEntry]) -> Vec<VehicleStats> {
    let mut by_vehicle: BTreeMap<u64, VehicleStats> = BTreeMap::new();
    for entry in entries {
        by_vehicle
            .entry(entry.vehicle_id)
            .or_insert_with(|| VehicleStats::new(entry.vehicle_id))
            .record(entry);
    }
    by_vehicle.into_values().collect()
}
