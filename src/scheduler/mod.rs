//! Schedule evaluation.
//!
//! `ScheduleKpi` measures how well a schedule meets the soft goals;
//! `verify_schedule` re-checks the hard rules on any schedule, including
//! ones loaded from disk.

mod kpi;
mod verify;

pub use kpi::{ScheduleKpi, SplashOverlap};
pub use verify::verify_schedule;
