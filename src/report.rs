//! Human-readable schedule report.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Schedule, SlotRef, ZoneGroup};
use crate::scheduler::ScheduleKpi;

/// Day-major and zone-major listing of a schedule.
pub struct ScheduleReport<'a> {
    schedule: &'a Schedule,
    kpi: ScheduleKpi,
}

impl<'a> ScheduleReport<'a> {
    /// `slot_minutes` is only used for the utilization summary.
    pub fn new(schedule: &'a Schedule, slot_minutes: u32) -> Self {
        Self {
            schedule,
            kpi: ScheduleKpi::calculate(schedule, slot_minutes),
        }
    }
}

impl fmt::Display for ScheduleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.schedule;

        writeln!(f, "*** Day plan:")?;
        for day in 0..s.num_days() {
            writeln!(f, "  Day {day}:")?;
            for slot in 0..s.daily_slots {
                let cell = SlotRef::new(day, slot);
                writeln!(f, "    Slot {slot} ({:>3} minutes):", s.slot_load(cell))?;
                for group in ZoneGroup::ALL {
                    let minutes = s.group_load(cell, group);
                    if minutes == 0 {
                        continue;
                    }
                    writeln!(f, "      Group {group} ({minutes} minutes):")?;
                    for zone in s
                        .zones_at(cell)
                        .iter()
                        .filter_map(|n| s.zone(n))
                        .filter(|z| z.group == group)
                    {
                        writeln!(
                            f,
                            "      {:>25} ({}m every {}d)",
                            zone.name, zone.duration, zone.interval
                        )?;
                    }
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "*** Zone plan:")?;
        for (name, cells) in &s.zone_plan {
            let interval = s.zone(name).map(|z| z.interval).unwrap_or_default();
            write!(f, "  {name} (every {interval}d): ")?;
            for cell in cells {
                write!(f, "day {:>2} slot {}, ", cell.day, cell.slot)?;
            }
            writeln!(f)?;

            let mut by_neighbour: BTreeMap<&str, Vec<SlotRef>> = BTreeMap::new();
            for o in self.kpi.overlaps_of(name) {
                by_neighbour.entry(o.other.as_str()).or_default().push(o.cell);
            }
            for (other, cells) in by_neighbour {
                write!(f, "    overlapping {other} on: ")?;
                for cell in cells {
                    write!(f, " day {} slot {}, ", cell.day, cell.slot)?;
                }
                writeln!(f)?;
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "*** Summary: slot load {}..={} minutes, utilization {:.0}%, max group imbalance {} minutes, max splash overlap {}",
            self.kpi.min_slot_load,
            self.kpi.max_slot_load,
            self.kpi.avg_utilization * 100.0,
            self.kpi.max_group_imbalance,
            self.kpi.max_splash_overlap
        )
    }
}
