//! Planning horizon and per-zone targets.
//!
//! The horizon is built from the least common multiple of all requested
//! intervals, so every zone's interval divides it evenly and a periodic
//! assignment can exist at all.
//!
//! | Quantity | Definition |
//! |----------|-----------|
//! | `max_interval` | lcm of the distinct zone intervals |
//! | `num_days` | `max_interval × daily_slots` |
//! | `target(z)` | `(max_interval / z.interval) × daily_slots` |
//!
//! Each watering advances one slot, so a zone needs `daily_slots` passes
//! over its interval to come back to its starting slot; scaling the day
//! count by `daily_slots` makes room for exactly that rotation.

use crate::error::{PlanError, Result};
use crate::models::Zone;

/// Horizon and targets derived from a zone set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Least common multiple of all zone intervals (days).
    pub max_interval: usize,
    /// Days in the planning horizon.
    pub num_days: usize,
    /// Slots per day.
    pub daily_slots: usize,
    /// Exact number of cells each zone must occupy, by zone index.
    pub targets: Vec<usize>,
}

impl Cycle {
    /// Derives the cycle for `zones` with `daily_slots` slots per day.
    ///
    /// Fails with a configuration error on an empty zone set, a zero
    /// interval, a zero slot count, or a horizon that overflows.
    pub fn compute(zones: &[Zone], daily_slots: u32) -> Result<Self> {
        if zones.is_empty() {
            return Err(PlanError::Config("no zones to schedule".into()));
        }
        if daily_slots == 0 {
            return Err(PlanError::Config("daily_slots must be at least 1".into()));
        }
        let daily_slots = daily_slots as usize;

        let mut max_interval: usize = 1;
        for zone in zones {
            if zone.interval == 0 {
                return Err(PlanError::Config(format!(
                    "zone '{}' has a non-positive interval",
                    zone.name
                )));
            }
            max_interval = lcm(max_interval, zone.interval as usize).ok_or_else(|| {
                PlanError::Config("interval least common multiple overflows".into())
            })?;
        }

        let num_days = max_interval
            .checked_mul(daily_slots)
            .ok_or_else(|| PlanError::Config("planning horizon overflows".into()))?;

        let targets = zones
            .iter()
            .map(|z| (max_interval / z.interval as usize) * daily_slots)
            .collect();

        Ok(Self {
            max_interval,
            num_days,
            daily_slots,
            targets,
        })
    }

    /// Total cells in the horizon.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.num_days * self.daily_slots
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm(a: usize, b: usize) -> Option<usize> {
    (a / gcd(a, b)).checked_mul(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ZoneGroup;

    #[test]
    fn test_two_daily_zones() {
        let zones = vec![
            Zone::new("A", 1, 10, ZoneGroup::A),
            Zone::new("B", 1, 10, ZoneGroup::B),
        ];
        let cycle = Cycle::compute(&zones, 2).unwrap();
        assert_eq!(cycle.max_interval, 1);
        assert_eq!(cycle.num_days, 2);
        assert_eq!(cycle.targets, vec![2, 2]);
        assert_eq!(cycle.cell_count(), 4);
    }

    #[test]
    fn test_mixed_intervals() {
        let zones = vec![
            Zone::new("a", 2, 10, ZoneGroup::A),
            Zone::new("b", 3, 10, ZoneGroup::B),
            Zone::new("c", 4, 10, ZoneGroup::B),
            Zone::new("d", 2, 10, ZoneGroup::A),
        ];
        let cycle = Cycle::compute(&zones, 3).unwrap();
        assert_eq!(cycle.max_interval, 12);
        assert_eq!(cycle.num_days, 36);
        assert_eq!(cycle.targets, vec![18, 12, 9, 18]);
    }

    #[test]
    fn test_targets_divide_horizon() {
        let zones = vec![
            Zone::new("a", 5, 10, ZoneGroup::A),
            Zone::new("b", 7, 10, ZoneGroup::B),
        ];
        let cycle = Cycle::compute(&zones, 2).unwrap();
        for (zone, target) in zones.iter().zip(&cycle.targets) {
            assert_eq!(target * zone.interval as usize, cycle.num_days);
        }
    }

    #[test]
    fn test_empty_zone_set_fails() {
        assert!(matches!(Cycle::compute(&[], 2), Err(PlanError::Config(_))));
    }

    #[test]
    fn test_zero_interval_fails() {
        let zones = vec![Zone::new("a", 0, 10, ZoneGroup::A)];
        assert!(matches!(Cycle::compute(&zones, 2), Err(PlanError::Config(_))));
    }

    #[test]
    fn test_zero_slots_fails() {
        let zones = vec![Zone::new("a", 1, 10, ZoneGroup::A)];
        assert!(matches!(Cycle::compute(&zones, 0), Err(PlanError::Config(_))));
    }

    #[test]
    fn test_gcd_lcm() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(lcm(4, 6), Some(12));
        assert_eq!(lcm(usize::MAX, 2), None);
    }
}
