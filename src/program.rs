//! Controller program generation.
//!
//! Turns a schedule into one interval-day program per (day, slot): the
//! program repeats every `num_days` days, starts on day `day` of the cycle,
//! and runs the cell's zones at the slot's start time. Transport to the
//! controller is left to the caller.
//!
//! Controllers run the two groups side by side, so within one program the
//! group with fewer total minutes is stretched to match the other.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{PlanError, Result};
use crate::models::{Schedule, SlotRef, Zone, ZoneGroup};
use crate::settings::ProgramSettings;

/// Enabled, interval-day schedule type, fixed start times, no date range.
pub const PROGRAM_FLAG: u8 = 0b0111_0011;

/// Largest station count a controller supports.
pub const MAX_STATIONS: usize = 200;

/// Zone name → controller station index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationMap {
    stations: BTreeMap<String, usize>,
    count: usize,
}

impl StationMap {
    /// Creates a map for a controller with `count` stations.
    pub fn new(count: usize) -> Self {
        Self {
            stations: BTreeMap::new(),
            count,
        }
    }

    /// Maps a zone to a station, growing the station count if needed.
    pub fn with_station(mut self, zone: impl Into<String>, index: usize) -> Self {
        self.stations.insert(zone.into(), index);
        self.count = self.count.max(index.saturating_add(1));
        self
    }

    /// Builds a map from zone name → index pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, usize)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(0), |map, (zone, index)| map.with_station(zone, index))
    }

    pub fn station(&self, zone: &str) -> Option<usize> {
        self.stations.get(zone).copied()
    }

    /// Number of stations on the controller.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// A controller program for one (day, slot) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramDefinition {
    pub name: String,
    /// Days between runs (the schedule horizon).
    pub interval_days: u32,
    /// Day of the cycle the program starts on.
    pub remainder: u32,
    /// Minutes after midnight.
    pub start_minute: u32,
    /// Run time per station, in seconds.
    pub durations_secs: Vec<u32>,
}

impl ProgramDefinition {
    /// Encodes the controller's program value:
    /// `[flag, days0, days1, [start0, -1, -1, -1], durations]`.
    pub fn payload(&self) -> Value {
        json!([
            PROGRAM_FLAG,
            self.remainder,
            self.interval_days,
            [self.start_minute, -1, -1, -1],
            self.durations_secs,
        ])
    }

    /// Query parameters of a create-program request.
    pub fn request_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("pid", "-1".to_string()),
            ("name", self.name.clone()),
            ("v", self.payload().to_string()),
        ]
    }
}

/// Builds the program definitions of a whole schedule, day-major.
///
/// # Errors
/// `Config` if a slot has no start time, a watered zone has no station,
/// the station map exceeds [`MAX_STATIONS`], or the schedule is empty.
pub fn build_programs(
    schedule: &Schedule,
    settings: &ProgramSettings,
    stations: &StationMap,
) -> Result<Vec<ProgramDefinition>> {
    if stations.count() > MAX_STATIONS {
        return Err(PlanError::Config(format!(
            "station map needs {} stations, controllers support at most {MAX_STATIONS}",
            stations.count()
        )));
    }
    let num_days = u32::try_from(schedule.num_days())
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| PlanError::Config("schedule has no days".into()))?;
    let prefix = settings.prefix();

    let mut programs = Vec::with_capacity(schedule.num_days() * schedule.daily_slots);
    for cell in schedule.cells() {
        let slot = settings.slots.get(cell.slot);
        let slot_name = slot
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("slot {}", cell.slot + 1));
        let start_minute = slot.and_then(|s| s.start_minute).ok_or_else(|| {
            PlanError::Config(format!("no start time for slot {}", cell.slot + 1))
        })?;

        let zones: Vec<&Zone> = schedule
            .zones_at(cell)
            .iter()
            .filter_map(|n| schedule.zone(n))
            .collect();

        programs.push(ProgramDefinition {
            name: format!("{prefix}Day {} {slot_name}", cell.day + 1),
            interval_days: num_days,
            remainder: cell.day as u32,
            start_minute,
            durations_secs: station_durations(&zones, stations, cell)?,
        });
    }
    Ok(programs)
}

/// Per-station run times in seconds for the zones of one cell, with the
/// shorter group scaled up to the longer one.
fn station_durations(zones: &[&Zone], stations: &StationMap, cell: SlotRef) -> Result<Vec<u32>> {
    let total = |group: ZoneGroup| -> u32 {
        zones
            .iter()
            .filter(|z| z.group == group)
            .map(|z| z.duration)
            .sum()
    };
    let (a, b) = (total(ZoneGroup::A), total(ZoneGroup::B));
    let scaling = if a == 0 || b == 0 || a == b {
        None
    } else if a < b {
        Some((ZoneGroup::A, f64::from(b) / f64::from(a)))
    } else {
        Some((ZoneGroup::B, f64::from(a) / f64::from(b)))
    };

    let mut durations = vec![0u32; stations.count()];
    for zone in zones {
        let index = stations.station(&zone.name).ok_or_else(|| {
            PlanError::Config(format!("zone '{}' has no controller station", zone.name))
        })?;
        let mut seconds = f64::from(zone.duration) * 60.0;
        if let Some((group, factor)) = scaling {
            if zone.group == group {
                let scaled = seconds * factor;
                debug!(
                    zone = %zone.name,
                    day = cell.day,
                    slot = cell.slot,
                    from_min = seconds / 60.0,
                    to_min = scaled / 60.0,
                    "scaling zone duration"
                );
                seconds = scaled;
            }
        }
        durations[index] = seconds.round() as u32;
    }
    Ok(durations)
}

/// Names of existing controller programs generated with `settings`' prefix.
///
/// Refuses to match when the prefix is empty, since that would select
/// every program on the controller.
pub fn programs_to_delete<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    settings: &ProgramSettings,
) -> Result<Vec<String>> {
    if settings.name_prefix.is_empty() {
        return Err(PlanError::Config(
            "program_name_prefix is required to select generated programs".into(),
        ));
    }
    let prefix = settings.prefix();
    Ok(existing
        .into_iter()
        .filter(|name| name.starts_with(&prefix))
        .map(str::to_string)
        .collect())
}
