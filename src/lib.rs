//! Irrigation watering-schedule planner.
//!
//! Assigns irrigation zones to (day, slot) cells over a repeating horizon
//! so that every zone is watered at its own interval, each slot stays
//! within its minute budget, and both valve groups run in every slot.
//! Among the feasible schedules the planner prefers even slot loads,
//! balanced groups and few splash overlaps between neighbouring zones.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Zone`, `ZoneGroup`, `Schedule`, `SlotRef`, `Violation`
//! - **`settings`**: Planner and program settings read from INI/TOML files
//! - **`zones`**: Zone records loaded from JSON or TOML
//! - **`validation`**: Input integrity checks (duplicates, intervals, splash refs)
//! - **`cycle`**: Horizon length and per-zone watering targets
//! - **`cp`**: Binary model construction, MILP solve, and decoding
//! - **`planner`**: One planning run end to end
//! - **`scheduler`**: KPIs and independent verification of a schedule
//! - **`program`**: Controller program definitions for a schedule
//! - **`report`**: Human-readable schedule listing
//!
//! # Example
//!
//! ```no_run
//! use sprinkler_plan::models::{Zone, ZoneGroup};
//! use sprinkler_plan::planner::plan_schedule;
//! use sprinkler_plan::settings::PlannerConfig;
//!
//! let zones = vec![
//!     Zone::new("a1", 1, 10, ZoneGroup::A),
//!     Zone::new("a2", 1, 10, ZoneGroup::A),
//!     Zone::new("b1", 1, 10, ZoneGroup::B),
//!     Zone::new("b2", 1, 10, ZoneGroup::B),
//! ];
//! let outcome = plan_schedule(&zones, &PlannerConfig::new(2, 20)).unwrap();
//! if let Some(schedule) = outcome.schedule() {
//!     assert_eq!(schedule.num_days(), 2);
//! }
//! ```
//!
//! # References
//!
//! - Wolsey (1998), "Integer Programming"
//! - Ehrgott (2005), "Multicriteria Optimization", lexicographic methods

pub mod cp;
pub mod cycle;
pub mod error;
pub mod models;
pub mod planner;
pub mod program;
pub mod report;
pub mod scheduler;
pub mod settings;
pub mod validation;
pub mod zones;

pub use error::{PlanError, Result};
pub use planner::{plan_schedule, PlanOutcome, Planner};
