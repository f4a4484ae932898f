//! Converts a solved cell assignment into a [`Schedule`].

use crate::cycle::Cycle;
use crate::models::{Schedule, SlotRef, Zone};

use super::solver::CellAssignment;
use super::WateringModel;

/// Builds both schedule views from an assignment.
///
/// Each cell variable is read exactly once, walking days, then slots, then
/// zones. The schedule's own ordering makes the result independent of the
/// zone declaration order.
pub fn decode_assignment(
    zones: &[Zone],
    cycle: &Cycle,
    model: &WateringModel,
    assignment: &CellAssignment,
) -> Schedule {
    let mut schedule = Schedule::new(zones.to_vec(), cycle.num_days, cycle.daily_slots);
    for day in 0..cycle.num_days {
        for slot in 0..cycle.daily_slots {
            for (l, zone) in zones.iter().enumerate() {
                if assignment.value(model.cell(l, day, slot)) {
                    schedule.add_occurrence(&zone.name, SlotRef::new(day, slot));
                }
            }
        }
    }
    schedule
}
