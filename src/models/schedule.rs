//! Watering schedule (solution) model.
//!
//! A schedule is the decoded result of one solve, held in two views over
//! the same assignment:
//! - day-major: `days[day][slot]` lists the zones watered in that cell
//! - zone-major: `zone_plan[zone]` lists the cells a zone occupies
//!
//! Both views are ordered by cell (day, then slot) and, within a cell, by
//! zone name, so the result never depends on zone declaration order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::{Zone, ZoneGroup};
use crate::error::{PlanError, Result};

/// One (day, slot) cell of the planning horizon.
///
/// Ordering is the day/slot enumeration order used throughout the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    /// Zero-based day within the horizon.
    pub day: usize,
    /// Zero-based slot within the day.
    pub slot: usize,
}

impl SlotRef {
    pub fn new(day: usize, slot: usize) -> Self {
        Self { day, slot }
    }

    /// Linear position in day/slot enumeration order.
    #[inline]
    pub fn ordinal(&self, daily_slots: usize) -> usize {
        self.day * daily_slots + self.slot
    }
}

/// A complete watering schedule over one horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Slots per day.
    pub daily_slots: usize,
    /// The zones the schedule was planned for.
    pub zones: Vec<Zone>,
    /// Day-major view: day → slot → zone names.
    pub days: Vec<Vec<Vec<String>>>,
    /// Zone-major view: zone name → occupied cells in enumeration order.
    pub zone_plan: BTreeMap<String, Vec<SlotRef>>,
}

/// A rule broken by a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Zone name or cell label the violation concerns.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A slot's total duration exceeds the slot budget.
    CapacityExceeded,
    /// A group is absent from a slot or exceeds half the budget.
    GroupImbalance,
    /// A zone's occurrence count differs from its target.
    TargetMismatch,
    /// Consecutive occurrences are not one interval and one slot apart.
    SpacingViolation,
    /// The day-major and zone-major views disagree.
    InconsistentViews,
    /// A view names a zone the schedule does not declare.
    UnknownZone,
}

impl Violation {
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

impl Schedule {
    /// Creates an empty schedule grid of `num_days × daily_slots` cells.
    ///
    /// Every zone gets an (empty) entry in the zone-major view.
    pub fn new(zones: Vec<Zone>, num_days: usize, daily_slots: usize) -> Self {
        let zone_plan = zones
            .iter()
            .map(|z| (z.name.clone(), Vec::new()))
            .collect();
        Self {
            daily_slots,
            zones,
            days: vec![vec![Vec::new(); daily_slots]; num_days],
            zone_plan,
        }
    }

    /// Rebuilds a schedule from its day-major view alone.
    ///
    /// Fails if the grid is ragged or names an undeclared zone.
    pub fn from_day_plan(
        zones: Vec<Zone>,
        days: Vec<Vec<Vec<String>>>,
        daily_slots: usize,
    ) -> Result<Self> {
        let mut schedule = Self::new(zones, days.len(), daily_slots);
        for (day, slots) in days.into_iter().enumerate() {
            if slots.len() != daily_slots {
                return Err(PlanError::Config(format!(
                    "day {day} has {} slots, expected {daily_slots}",
                    slots.len()
                )));
            }
            for (slot, names) in slots.into_iter().enumerate() {
                for name in names {
                    if schedule.zone(&name).is_none() {
                        return Err(PlanError::Config(format!(
                            "day {day} slot {slot} names unknown zone '{name}'"
                        )));
                    }
                    schedule.add_occurrence(&name, SlotRef::new(day, slot));
                }
            }
        }
        Ok(schedule)
    }

    /// Records that `zone` is watered at `cell`, updating both views.
    ///
    /// Insertion keeps both views sorted, so call order does not matter.
    /// Recording the same occurrence twice is a no-op.
    pub fn add_occurrence(&mut self, zone: &str, cell: SlotRef) {
        let names = &mut self.days[cell.day][cell.slot];
        if let Err(pos) = names.binary_search_by(|n| n.as_str().cmp(zone)) {
            names.insert(pos, zone.to_string());
        }
        let cells = self.zone_plan.entry(zone.to_string()).or_default();
        if let Err(pos) = cells.binary_search(&cell) {
            cells.insert(pos, cell);
        }
    }

    /// Number of days in the horizon.
    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    /// Whether no zone is watered anywhere.
    pub fn is_empty(&self) -> bool {
        self.days.iter().flatten().all(|names| names.is_empty())
    }

    /// Zones watered in one cell (empty for out-of-range cells).
    pub fn zones_at(&self, cell: SlotRef) -> &[String] {
        self.days
            .get(cell.day)
            .and_then(|d| d.get(cell.slot))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cells occupied by a zone, in enumeration order.
    pub fn occurrences(&self, zone: &str) -> &[SlotRef] {
        self.zone_plan.get(zone).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Looks up a zone record by name.
    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// All cells of the horizon in enumeration order.
    pub fn cells(&self) -> impl Iterator<Item = SlotRef> + '_ {
        let slots = self.daily_slots;
        (0..self.num_days()).flat_map(move |d| (0..slots).map(move |s| SlotRef::new(d, s)))
    }

    /// Total minutes watered in a cell.
    pub fn slot_load(&self, cell: SlotRef) -> u32 {
        self.zones_at(cell)
            .iter()
            .filter_map(|n| self.zone(n))
            .map(|z| z.duration)
            .sum()
    }

    /// Minutes contributed by one group in a cell.
    pub fn group_load(&self, cell: SlotRef, group: ZoneGroup) -> u32 {
        self.zones_at(cell)
            .iter()
            .filter_map(|n| self.zone(n))
            .filter(|z| z.group == group)
            .map(|z| z.duration)
            .sum()
    }

    /// Whether the day-major and zone-major views describe the same
    /// set of (zone, day, slot) triples.
    pub fn is_consistent(&self) -> bool {
        let mut from_days: Vec<(String, SlotRef)> = Vec::new();
        for cell in self.cells() {
            for name in self.zones_at(cell) {
                from_days.push((name.clone(), cell));
            }
        }
        let mut from_zones: Vec<(String, SlotRef)> = self
            .zone_plan
            .iter()
            .flat_map(|(name, cells)| cells.iter().map(move |c| (name.clone(), *c)))
            .collect();
        from_days.sort();
        from_zones.sort();
        from_days == from_zones
    }

    /// Writes the schedule as JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads a schedule written by [`save_json`](Self::save_json).
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let schedule: Schedule = serde_json::from_reader(reader)?;
        if !schedule.is_consistent() {
            return Err(PlanError::Config(
                "stored schedule views are inconsistent".into(),
            ));
        }
        Ok(schedule)
    }
}
