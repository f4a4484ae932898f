//! Independent check of a schedule against every hard rule.
//!
//! Works on any schedule, whether fresh from the solver or replayed from a
//! file, without rebuilding the model.

use crate::cycle::Cycle;
use crate::models::{Schedule, Violation, ViolationType, ZoneGroup};

/// Returns every rule the schedule breaks for a `slot_minutes` budget.
///
/// An empty vector means the schedule is valid.
pub fn verify_schedule(schedule: &Schedule, slot_minutes: u32) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !schedule.is_consistent() {
        violations.push(Violation::new(
            ViolationType::InconsistentViews,
            "schedule",
            "day-major and zone-major views disagree",
        ));
    }

    for cell in schedule.cells() {
        let label = format!("day {} slot {}", cell.day, cell.slot);

        for name in schedule.zones_at(cell) {
            if schedule.zone(name).is_none() {
                violations.push(Violation::new(
                    ViolationType::UnknownZone,
                    name.clone(),
                    format!("{label} waters undeclared zone '{name}'"),
                ));
            }
        }

        let load = schedule.slot_load(cell);
        if load > slot_minutes {
            violations.push(Violation::new(
                ViolationType::CapacityExceeded,
                label.clone(),
                format!("{label} uses {load} of {slot_minutes} minutes"),
            ));
        }

        let limit = slot_minutes / 2;
        for group in ZoneGroup::ALL {
            let minutes = schedule.group_load(cell, group);
            if minutes == 0 || minutes > limit {
                violations.push(Violation::new(
                    ViolationType::GroupImbalance,
                    label.clone(),
                    format!("{label} gives group {group} {minutes} minutes (allowed 1..={limit})"),
                ));
            }
        }
    }

    match Cycle::compute(&schedule.zones, schedule.daily_slots as u32) {
        Ok(cycle) => {
            if cycle.num_days != schedule.num_days() {
                violations.push(Violation::new(
                    ViolationType::TargetMismatch,
                    "schedule",
                    format!(
                        "horizon is {} days, zone intervals require {}",
                        schedule.num_days(),
                        cycle.num_days
                    ),
                ));
            }
            for (zone, &target) in schedule.zones.iter().zip(&cycle.targets) {
                let count = schedule.occurrences(&zone.name).len();
                if count != target {
                    violations.push(Violation::new(
                        ViolationType::TargetMismatch,
                        zone.name.clone(),
                        format!("zone '{}' watered {count} times, target {target}", zone.name),
                    ));
                }
            }
        }
        Err(e) => violations.push(Violation::new(
            ViolationType::TargetMismatch,
            "schedule",
            e.to_string(),
        )),
    }

    let slots = schedule.daily_slots.max(1);
    for zone in &schedule.zones {
        for pair in schedule.occurrences(&zone.name).windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let expected_day = prev.day + zone.interval as usize;
            let expected_slot = (prev.slot + 1) % slots;
            if next.day != expected_day || next.slot != expected_slot {
                violations.push(Violation::new(
                    ViolationType::SpacingViolation,
                    zone.name.clone(),
                    format!(
                        "zone '{}' goes from day {} slot {} to day {} slot {}, expected day {expected_day} slot {expected_slot}",
                        zone.name, prev.day, prev.slot, next.day, next.slot
                    ),
                ));
            }
        }
    }

    violations
}
