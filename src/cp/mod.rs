//! Constraint formulation of the watering problem.
//!
//! Bridges the zone/configuration domain to a boolean decision model:
//! one variable per (zone, day, slot) cell, hard rules as linear
//! constraints and implications, soft goals folded into one objective.
//!
//! # Hard rules
//! - slot capacity: `Σ duration ≤ slot_minutes`
//! - group balance: `0 < Σ duration(group) ≤ slot_minutes / 2`, both groups
//! - frequency: exactly `target` cells per zone
//! - spacing: a watering implies the next one `interval` days and one slot
//!   later, with nothing in between
//!
//! # Soft goals
//! - load evenness: maximise the least loaded slot
//! - group evenness: minimise the largest |A − B| in a slot
//! - splash: minimise the largest number of overlapping zones running together
//!
//! # Reference
//! Baptiste et al. (2001), "Constraint-Based Scheduling"

mod builder;
mod decode;
mod model;
mod solver;

pub use builder::WateringModelBuilder;
pub use decode::decode_assignment;
pub use model::{
    AuxVar, Comparison, ConstraintKind, Implication, LinearConstraint, Objective, Var,
    WateringModel,
};
pub use solver::{
    CellAssignment, MilpSolver, ScheduleSolver, SolveOutcome, SolveStats, SolveStatus,
};
