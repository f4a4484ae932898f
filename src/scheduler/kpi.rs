//! Schedule quality metrics (KPIs).
//!
//! Measures a schedule against the three soft goals of the planner.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Min / max slot load | Least / most minutes watered in any cell |
//! | Avg utilization | Mean of load / slot_minutes over all cells |
//! | Max group imbalance | Largest |A − B| minutes in any cell |
//! | Max splash overlap | Largest count of a zone plus its running splash neighbours |
//! | Splash overlaps | Every (zone, neighbour, cell) watered together |

use serde::Serialize;

use crate::models::{Schedule, SlotRef, ZoneGroup};

/// Two declared splash neighbours watered in the same cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplashOverlap {
    pub zone: String,
    pub other: String,
    pub cell: SlotRef,
}

/// Schedule performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Minutes watered per cell: `[day][slot]`.
    pub slot_loads: Vec<Vec<u32>>,
    pub min_slot_load: u32,
    pub max_slot_load: u32,
    /// Average cell utilization (0.0..1.0).
    pub avg_utilization: f64,
    pub max_group_imbalance: u32,
    pub max_splash_overlap: usize,
    pub splash_overlaps: Vec<SplashOverlap>,
}

impl ScheduleKpi {
    /// Computes KPIs for a schedule planned with a `slot_minutes` budget.
    pub fn calculate(schedule: &Schedule, slot_minutes: u32) -> Self {
        let slot_loads: Vec<Vec<u32>> = (0..schedule.num_days())
            .map(|d| {
                (0..schedule.daily_slots)
                    .map(|s| schedule.slot_load(SlotRef::new(d, s)))
                    .collect()
            })
            .collect();
        let all_loads = || slot_loads.iter().flatten().copied();
        let cell_count = all_loads().count();

        let min_slot_load = all_loads().min().unwrap_or(0);
        let max_slot_load = all_loads().max().unwrap_or(0);
        let avg_utilization = if cell_count == 0 || slot_minutes == 0 {
            0.0
        } else {
            all_loads().map(f64::from).sum::<f64>() / (cell_count as f64 * f64::from(slot_minutes))
        };

        let max_group_imbalance = schedule
            .cells()
            .map(|c| {
                schedule
                    .group_load(c, ZoneGroup::A)
                    .abs_diff(schedule.group_load(c, ZoneGroup::B))
            })
            .max()
            .unwrap_or(0);

        let mut max_splash_overlap = 0;
        let mut splash_overlaps = Vec::new();
        for zone in &schedule.zones {
            let neighbours: Vec<&String> =
                zone.splash.iter().filter(|n| **n != zone.name).collect();
            if neighbours.is_empty() {
                continue;
            }
            for &cell in schedule.occurrences(&zone.name) {
                let running = schedule.zones_at(cell);
                let mut count = 1;
                for other in &neighbours {
                    if running.contains(*other) {
                        count += 1;
                        splash_overlaps.push(SplashOverlap {
                            zone: zone.name.clone(),
                            other: (*other).clone(),
                            cell,
                        });
                    }
                }
                max_splash_overlap = max_splash_overlap.max(count);
            }
        }

        Self {
            slot_loads,
            min_slot_load,
            max_slot_load,
            avg_utilization,
            max_group_imbalance,
            max_splash_overlap,
            splash_overlaps,
        }
    }

    /// Overlaps involving one zone, as (neighbour, cell).
    pub fn overlaps_of<'a>(&'a self, zone: &'a str) -> impl Iterator<Item = &'a SplashOverlap> {
        self.splash_overlaps.iter().filter(move |o| o.zone == zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Zone;

    fn sample() -> Schedule {
        let zones = vec![
            Zone::new("lawn", 1, 10, ZoneGroup::A).with_splash("beds"),
            Zone::new("beds", 1, 6, ZoneGroup::B),
            Zone::new("hedge", 1, 4, ZoneGroup::B),
        ];
        let mut s = Schedule::new(zones, 1, 2);
        s.add_occurrence("lawn", SlotRef::new(0, 0));
        s.add_occurrence("beds", SlotRef::new(0, 0));
        s.add_occurrence("hedge", SlotRef::new(0, 1));
        s
    }

    #[test]
    fn test_loads_and_utilization() {
        let kpi = ScheduleKpi::calculate(&sample(), 20);
        assert_eq!(kpi.slot_loads, vec![vec![16, 4]]);
        assert_eq!(kpi.min_slot_load, 4);
        assert_eq!(kpi.max_slot_load, 16);
        assert!((kpi.avg_utilization - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_group_imbalance() {
        let kpi = ScheduleKpi::calculate(&sample(), 20);
        // cell (0,0): A 10, B 6 → 4; cell (0,1): A 0, B 4 → 4
        assert_eq!(kpi.max_group_imbalance, 4);
    }

    #[test]
    fn test_splash_overlaps() {
        let kpi = ScheduleKpi::calculate(&sample(), 20);
        assert_eq!(kpi.max_splash_overlap, 2);
        assert_eq!(
            kpi.splash_overlaps,
            vec![SplashOverlap {
                zone: "lawn".into(),
                other: "beds".into(),
                cell: SlotRef::new(0, 0),
            }]
        );
        assert_eq!(kpi.overlaps_of("lawn").count(), 1);
        assert_eq!(kpi.overlaps_of("beds").count(), 0);
    }

    #[test]
    fn test_empty_schedule() {
        let kpi = ScheduleKpi::calculate(&Schedule::default(), 20);
        assert_eq!(kpi.min_slot_load, 0);
        assert_eq!(kpi.max_group_imbalance, 0);
        assert!((kpi.avg_utilization - 0.0).abs() < 1e-10);
        assert!(kpi.splash_overlaps.is_empty());
    }

    #[test]
    fn test_zero_budget_utilization() {
        let kpi = ScheduleKpi::calculate(&sample(), 0);
        assert!((kpi.avg_utilization - 0.0).abs() < 1e-10);
    }
}
