//! Planning run orchestration.
//!
//! One run = validate → cycle → build model → solve once → decode.
//! Runs share nothing; each builds its model from scratch.

use tracing::info;

use crate::cp::{
    decode_assignment, MilpSolver, ScheduleSolver, SolveOutcome, SolveStats, WateringModelBuilder,
};
use crate::cycle::Cycle;
use crate::error::Result;
use crate::models::{Schedule, Zone};
use crate::settings::PlannerConfig;
use crate::validation::validate_zones;

/// Result of a planning run that got as far as the solver.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    /// A full schedule satisfying every hard rule.
    Scheduled {
        schedule: Schedule,
        stats: SolveStats,
    },
    /// No schedule exists for these zones and settings.
    Infeasible(SolveStats),
}

impl PlanOutcome {
    /// The schedule, if one was found.
    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            PlanOutcome::Scheduled { schedule, .. } => Some(schedule),
            PlanOutcome::Infeasible(_) => None,
        }
    }

    /// Consumes the outcome, yielding the schedule if one was found.
    pub fn into_schedule(self) -> Option<Schedule> {
        match self {
            PlanOutcome::Scheduled { schedule, .. } => Some(schedule),
            PlanOutcome::Infeasible(_) => None,
        }
    }

    pub fn stats(&self) -> &SolveStats {
        match self {
            PlanOutcome::Scheduled { stats, .. } => stats,
            PlanOutcome::Infeasible(stats) => stats,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, PlanOutcome::Infeasible(_))
    }
}

/// Runs the planner with a caller-supplied solver.
pub struct Planner<S: ScheduleSolver> {
    solver: S,
}

impl Default for Planner<MilpSolver> {
    fn default() -> Self {
        Self::new(MilpSolver::new())
    }
}

impl<S: ScheduleSolver> Planner<S> {
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    /// Plans a schedule for `zones`.
    ///
    /// # Errors
    /// - `Validation` / `Config` for bad inputs, before any model is built
    /// - `Solver` if the search could not run
    ///
    /// Infeasibility is returned as [`PlanOutcome::Infeasible`].
    pub fn plan(&self, zones: &[Zone], config: &PlannerConfig) -> Result<PlanOutcome> {
        validate_zones(zones, config)?;
        let cycle = Cycle::compute(zones, config.daily_slots)?;
        info!(
            zones = zones.len(),
            max_interval = cycle.max_interval,
            num_days = cycle.num_days,
            daily_slots = cycle.daily_slots,
            slot_minutes = config.slot_minutes,
            objective = %config.solver.objective,
            "planning horizon"
        );

        let model = WateringModelBuilder::new(zones, config, &cycle).build()?;
        match self.solver.solve(&model, &config.solver)? {
            SolveOutcome::Solved { assignment, stats } => {
                let schedule = decode_assignment(zones, &cycle, &model, &assignment);
                debug_assert!(schedule.is_consistent());
                Ok(PlanOutcome::Scheduled { schedule, stats })
            }
            SolveOutcome::Infeasible(stats) => {
                info!("no feasible schedule");
                Ok(PlanOutcome::Infeasible(stats))
            }
        }
    }
}

/// Plans a schedule with the default MILP solver.
pub fn plan_schedule(zones: &[Zone], config: &PlannerConfig) -> Result<PlanOutcome> {
    Planner::default().plan(zones, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{CellAssignment, SolveStatus, WateringModel};
    use crate::error::PlanError;
    use crate::models::{SlotRef, ZoneGroup};
    use crate::settings::SolverOptions;
    use std::time::Duration;

    fn stats(status: SolveStatus) -> SolveStats {
        SolveStats {
            status,
            objectives: Vec::new(),
            variables: 0,
            constraints: 0,
            wall_time: Duration::ZERO,
        }
    }

    /// Turns on the cells of zone 0 at (0,0) and zone 1 at (0,1).
    struct FixedSolver;

    impl ScheduleSolver for FixedSolver {
        fn solve(&self, model: &WateringModel, _: &SolverOptions) -> Result<SolveOutcome> {
            let mut values = vec![false; model.cell_count()];
            values[model.cell(0, 0, 0)] = true;
            values[model.cell(1, 0, 1)] = true;
            Ok(SolveOutcome::Solved {
                assignment: CellAssignment::new(values),
                stats: stats(SolveStatus::Feasible),
            })
        }
    }

    struct NoSolution;

    impl ScheduleSolver for NoSolution {
        fn solve(&self, _: &WateringModel, _: &SolverOptions) -> Result<SolveOutcome> {
            Ok(SolveOutcome::Infeasible(stats(SolveStatus::Infeasible)))
        }
    }

    struct Broken;

    impl ScheduleSolver for Broken {
        fn solve(&self, _: &WateringModel, _: &SolverOptions) -> Result<SolveOutcome> {
            Err(PlanError::Solver("backend unavailable".into()))
        }
    }

    fn zones() -> Vec<Zone> {
        vec![
            Zone::new("A", 1, 10, ZoneGroup::A),
            Zone::new("B", 1, 10, ZoneGroup::B),
        ]
    }

    #[test]
    fn test_plan_decodes_solver_assignment() {
        let outcome = Planner::new(FixedSolver)
            .plan(&zones(), &PlannerConfig::new(2, 20))
            .unwrap();
        let schedule = outcome.schedule().unwrap();
        assert_eq!(schedule.occurrences("A"), [SlotRef::new(0, 0)]);
        assert_eq!(schedule.occurrences("B"), [SlotRef::new(0, 1)]);
        assert_eq!(outcome.stats().status, SolveStatus::Feasible);
    }

    #[test]
    fn test_infeasible_is_not_an_error() {
        let outcome = Planner::new(NoSolution)
            .plan(&zones(), &PlannerConfig::new(2, 20))
            .unwrap();
        assert!(outcome.is_infeasible());
        assert!(outcome.into_schedule().is_none());
    }

    #[test]
    fn test_solver_failure_propagates() {
        let err = Planner::new(Broken)
            .plan(&zones(), &PlannerConfig::new(2, 20))
            .unwrap_err();
        assert!(matches!(err, PlanError::Solver(_)));
    }

    #[test]
    fn test_validation_runs_before_solver() {
        let zones = vec![Zone::new("A", 0, 10, ZoneGroup::A)];
        let err = Planner::new(Broken)
            .plan(&zones, &PlannerConfig::new(2, 20))
            .unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
    }
}
