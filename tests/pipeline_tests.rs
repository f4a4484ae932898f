//! End-to-end planning runs with the MILP solver.

use std::time::{Duration, Instant};

use sprinkler_plan::cp::SolveStatus;
use sprinkler_plan::cycle::Cycle;
use sprinkler_plan::models::{Schedule, SlotRef, Zone, ZoneGroup};
use sprinkler_plan::planner::plan_schedule;
use sprinkler_plan::scheduler::{verify_schedule, ScheduleKpi};
use sprinkler_plan::settings::{ObjectiveStrategy, PlannerConfig};
use sprinkler_plan::validation::ValidationErrorKind;
use sprinkler_plan::PlanError;

/// Two zones per group, all watered daily for 10 minutes.
fn four_zones() -> Vec<Zone> {
    vec![
        Zone::new("a1", 1, 10, ZoneGroup::A),
        Zone::new("a2", 1, 10, ZoneGroup::A),
        Zone::new("b1", 1, 10, ZoneGroup::B),
        Zone::new("b2", 1, 10, ZoneGroup::B),
    ]
}

fn plan(zones: &[Zone], config: &PlannerConfig) -> Schedule {
    plan_schedule(zones, config)
        .unwrap()
        .into_schedule()
        .expect("expected a feasible schedule")
}

#[test]
fn test_four_zone_schedule_meets_hard_rules() {
    let zones = four_zones();
    let schedule = plan(&zones, &PlannerConfig::new(2, 20));

    assert_eq!(schedule.num_days(), 2);
    assert_eq!(schedule.daily_slots, 2);
    assert!(schedule.is_consistent());
    assert!(verify_schedule(&schedule, 20).is_empty());

    for zone in &zones {
        let cells = schedule.occurrences(&zone.name);
        assert_eq!(cells.len(), 2, "zone {}", zone.name);
        // Next day, next slot
        assert_eq!(cells[1].day, cells[0].day + 1);
        assert_eq!(cells[1].slot, (cells[0].slot + 1) % 2);
    }

    let kpi = ScheduleKpi::calculate(&schedule, 20);
    assert_eq!(kpi.min_slot_load, 20);
    assert_eq!(kpi.max_slot_load, 20);
    assert_eq!(kpi.max_group_imbalance, 0);
}

#[test]
fn test_result_independent_of_declaration_order() {
    let config = PlannerConfig::new(2, 20);
    let forward = plan(&four_zones(), &config);
    let mut reversed_zones = four_zones();
    reversed_zones.reverse();
    let reversed = plan(&reversed_zones, &config);

    for cell in forward.cells() {
        let names = forward.zones_at(cell);
        assert!(names.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(names.len(), reversed.zones_at(cell).len());
    }
}

#[test]
fn test_two_zone_cycle_is_infeasible() {
    let zones = vec![
        Zone::new("A", 1, 10, ZoneGroup::A),
        Zone::new("B", 1, 10, ZoneGroup::B),
    ];
    let cycle = Cycle::compute(&zones, 2).unwrap();
    assert_eq!(cycle.max_interval, 1);
    assert_eq!(cycle.num_days, 2);
    assert_eq!(cycle.targets, vec![2, 2]);

    // Every cell needs both groups, but each zone may only fill two of four
    let outcome = plan_schedule(&zones, &PlannerConfig::new(2, 20)).unwrap();
    assert!(outcome.is_infeasible());
}

#[test]
fn test_zero_slot_minutes_is_infeasible() {
    let outcome = plan_schedule(&four_zones(), &PlannerConfig::new(2, 0)).unwrap();
    assert!(outcome.is_infeasible());
}

#[test]
fn test_single_group_is_infeasible() {
    let zones = vec![
        Zone::new("x", 1, 5, ZoneGroup::A),
        Zone::new("y", 1, 5, ZoneGroup::A),
    ];
    let outcome = plan_schedule(&zones, &PlannerConfig::new(1, 30)).unwrap();
    assert!(outcome.is_infeasible());
    assert!(outcome.schedule().is_none());
}

#[test]
fn test_invalid_inputs_rejected_before_solving() {
    let config = PlannerConfig::new(2, 20);

    let mut zones = four_zones();
    zones[0].interval = 0;
    zones[3].name = "a2".into();
    zones[1] = zones[1].clone().with_splash("ghost");

    let Err(PlanError::Validation(errors)) = plan_schedule(&zones, &config) else {
        panic!("expected validation errors");
    };
    let kinds: Vec<_> = errors.iter().map(|e| e.kind.clone()).collect();
    assert!(kinds.contains(&ValidationErrorKind::InvalidInterval));
    assert!(kinds.contains(&ValidationErrorKind::DuplicateName));
    assert!(kinds.contains(&ValidationErrorKind::UnknownSplashZone));
}

#[test]
fn test_splash_neighbours_kept_apart() {
    let mut zones = four_zones();
    zones[0] = zones[0].clone().with_splash("b1");
    zones[2] = zones[2].clone().with_splash("a1");

    for objective in [
        ObjectiveStrategy::Lexicographic,
        ObjectiveStrategy::SplashOnly,
        ObjectiveStrategy::Weighted {
            load: 1.0,
            balance: 1.0,
            splash: 5.0,
        },
    ] {
        let config = PlannerConfig::new(2, 20).with_objective(objective);
        let schedule = plan(&zones, &config);
        assert!(verify_schedule(&schedule, 20).is_empty(), "{objective}");

        let kpi = ScheduleKpi::calculate(&schedule, 20);
        assert!(kpi.splash_overlaps.is_empty(), "{objective}");
        assert_eq!(kpi.max_splash_overlap, 1, "{objective}");
    }
}

#[test]
fn test_saved_schedule_reloads_and_verifies() {
    let schedule = plan(&four_zones(), &PlannerConfig::new(2, 20));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");

    schedule.save_json(&path).unwrap();
    let loaded = Schedule::load_json(&path).unwrap();

    assert_eq!(loaded, schedule);
    assert!(verify_schedule(&loaded, 20).is_empty());
    assert_eq!(
        loaded.occurrences("a1").len(),
        schedule.occurrences("a1").len()
    );
    assert!(loaded
        .cells()
        .all(|c: SlotRef| loaded.zones_at(c).len() == 2));
}

#[test]
fn test_mixed_intervals_rotate_and_hit_targets() {
    let zones = vec![
        Zone::new("a1", 1, 10, ZoneGroup::A),
        Zone::new("a2", 1, 10, ZoneGroup::A),
        Zone::new("b1", 2, 10, ZoneGroup::B),
        Zone::new("b2", 2, 10, ZoneGroup::B),
        Zone::new("b3", 2, 10, ZoneGroup::B),
        Zone::new("b4", 2, 10, ZoneGroup::B),
    ];
    let schedule = plan(&zones, &PlannerConfig::new(2, 20));

    assert_eq!(schedule.num_days(), 4);
    assert!(verify_schedule(&schedule, 20).is_empty());
    for zone in &zones {
        let cells = schedule.occurrences(&zone.name);
        assert_eq!(
            cells.len(),
            schedule.num_days() / zone.interval as usize,
            "zone {}",
            zone.name
        );
        for pair in cells.windows(2) {
            assert_eq!(pair[1].day, pair[0].day + zone.interval as usize);
            assert_eq!(pair[1].slot, (pair[0].slot + 1) % 2);
        }
    }
    // one zone of each group per cell
    for cell in schedule.cells() {
        assert_eq!(schedule.group_load(cell, ZoneGroup::A), 10);
        assert_eq!(schedule.group_load(cell, ZoneGroup::B), 10);
    }
}

/// Daily zones a/b plus four every-other-day zones. Only x+y / p+q gives
/// both days 40 minutes, but x and y splash each other.
fn competing_goal_zones() -> Vec<Zone> {
    vec![
        Zone::new("a", 1, 10, ZoneGroup::A),
        Zone::new("b", 1, 10, ZoneGroup::B),
        Zone::new("x", 2, 10, ZoneGroup::A).with_splash("y"),
        Zone::new("y", 2, 10, ZoneGroup::B),
        Zone::new("p", 2, 5, ZoneGroup::A),
        Zone::new("q", 2, 15, ZoneGroup::B),
    ]
}

#[test]
fn test_lexicographic_puts_load_evenness_before_splash() {
    let zones = competing_goal_zones();
    let schedule = plan(&zones, &PlannerConfig::new(1, 50));
    assert!(verify_schedule(&schedule, 50).is_empty());

    let kpi = ScheduleKpi::calculate(&schedule, 50);
    assert_eq!(kpi.min_slot_load, 40);
    assert_eq!(kpi.max_slot_load, 40);
    assert_eq!(schedule.occurrences("x"), schedule.occurrences("y"));
    assert_eq!(kpi.max_splash_overlap, 2);
}

#[test]
fn test_splash_only_gives_up_load_evenness() {
    let zones = competing_goal_zones();
    let config = PlannerConfig::new(1, 50).with_objective(ObjectiveStrategy::SplashOnly);
    let schedule = plan(&zones, &config);
    assert!(verify_schedule(&schedule, 50).is_empty());

    let kpi = ScheduleKpi::calculate(&schedule, 50);
    assert_ne!(schedule.occurrences("x"), schedule.occurrences("y"));
    assert_eq!(kpi.max_splash_overlap, 1);
    assert!(kpi.splash_overlaps.is_empty());
    assert!(kpi.min_slot_load < 40);
}

#[test]
fn test_default_objective_finishes_on_twelve_zones() {
    let mut zones = Vec::new();
    for group in ZoneGroup::ALL {
        for i in 0..3 {
            zones.push(Zone::new(format!("daily-{group}{i}"), 1, 10, group));
            zones.push(Zone::new(format!("third-{group}{i}"), 3, 5, group));
        }
    }
    let config = PlannerConfig::new(3, 30).with_time_limit(Duration::from_secs(20));

    let started = Instant::now();
    let outcome = plan_schedule(&zones, &config).unwrap();
    assert!(started.elapsed() < Duration::from_secs(60));

    assert!(matches!(
        outcome.stats().status,
        SolveStatus::Optimal | SolveStatus::Feasible
    ));
    let schedule = outcome.into_schedule().expect("expected a schedule");
    assert_eq!(schedule.num_days(), 9);
    assert!(verify_schedule(&schedule, 30).is_empty());
    let kpi = ScheduleKpi::calculate(&schedule, 30);
    assert!(kpi.min_slot_load <= 20);
}
