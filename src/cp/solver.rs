//! Solve invocation.
//!
//! [`ScheduleSolver`] is the seam between the model and a search engine.
//! [`MilpSolver`] hands the model to `good_lp` with the pure-Rust
//! `microlp` backend, once per objective.
//!
//! # Encoding
//! - cell → binary variable
//! - auxiliary → continuous variable within its bounds
//! - `x → y` → `y − x ≥ 0`
//! - `x → ¬y` → `x + y ≤ 1`
//!
//! # Objectives
//! Objectives are solved in priority order. After each solve the reached
//! value becomes a constraint of the next one, and the previous assignment
//! seeds the next search. One time limit covers every stage; when it runs
//! out the best assignment so far is returned as [`SolveStatus::Feasible`].

use std::time::{Duration, Instant};

use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, Variable, WithInitialSolution, WithTimeLimit,
};
use tracing::{debug, info, warn};

use super::model::{Comparison, Objective, Var, WateringModel};
use crate::error::{PlanError, Result};
use crate::settings::SolverOptions;

/// Slack granted when a reached objective value is fixed for later stages.
const FIX_TOLERANCE: f64 = 1e-6;

/// Outcome of a single solve.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// A complete assignment satisfying every hard constraint.
    Solved {
        assignment: CellAssignment,
        stats: SolveStats,
    },
    /// No assignment satisfies the hard constraints.
    Infeasible(SolveStats),
}

impl SolveOutcome {
    pub fn stats(&self) -> &SolveStats {
        match self {
            SolveOutcome::Solved { stats, .. } => stats,
            SolveOutcome::Infeasible(stats) => stats,
        }
    }

    pub fn is_solution_found(&self) -> bool {
        matches!(self, SolveOutcome::Solved { .. })
    }
}

/// Truth value of every cell, by dense cell index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAssignment {
    values: Vec<bool>,
}

impl CellAssignment {
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn value(&self, cell: usize) -> bool {
        self.values[cell]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.values
    }
}

/// Search status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimal for every objective.
    Optimal,
    /// Feasible, optimality not proven (time limit reached).
    Feasible,
    /// Proven infeasible.
    Infeasible,
}

/// Informational diagnostics of a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveStats {
    pub status: SolveStatus,
    /// Reached value of each objective that was solved, in priority order.
    pub objectives: Vec<f64>,
    pub variables: usize,
    pub constraints: usize,
    pub wall_time: Duration,
}

/// A search engine able to solve a [`WateringModel`].
pub trait ScheduleSolver {
    /// Solves the model once.
    ///
    /// Infeasibility is an `Ok` outcome; `Err` means the search itself
    /// could not run, or found nothing before the time limit.
    fn solve(&self, model: &WateringModel, options: &SolverOptions) -> Result<SolveOutcome>;
}

/// Mixed-integer solver backed by `good_lp` + `microlp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilpSolver;

impl MilpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl ScheduleSolver for MilpSolver {
    fn solve(&self, model: &WateringModel, options: &SolverOptions) -> Result<SolveOutcome> {
        let started = Instant::now();
        let deadline = options.time_limit.map(|limit| started + limit);
        let variables = model.cell_count() + model.aux_vars().len();
        let constraints = model.constraint_count();
        let stats = |status, objectives| SolveStats {
            status,
            objectives,
            variables,
            constraints,
            wall_time: started.elapsed(),
        };

        if model.is_trivially_infeasible() {
            info!(
                contradictions = model.contradictions().len(),
                "model contradicts itself, skipping search"
            );
            return Ok(SolveOutcome::Infeasible(stats(SolveStatus::Infeasible, Vec::new())));
        }

        let feasibility = [Objective::default()];
        let stages = if model.objectives().is_empty() {
            &feasibility[..]
        } else {
            model.objectives()
        };

        let mut status = SolveStatus::Optimal;
        let mut incumbent: Option<Vec<f64>> = None;
        let mut reached: Vec<(&Objective, f64)> = Vec::with_capacity(stages.len());

        for (stage, objective) in stages.iter().enumerate() {
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            if incumbent.is_some() && remaining.is_some_and(|r| r.is_zero()) {
                status = SolveStatus::Feasible;
                break;
            }

            match solve_stage(model, objective, &reached, incumbent.as_deref(), remaining) {
                Ok(StageSolution { values, proven }) => {
                    let value = objective.evaluate(|v| values[var_index(model, v)]);
                    debug!(stage, value, proven, "objective stage solved");
                    reached.push((objective, value));
                    incumbent = Some(values);
                    if !proven {
                        status = SolveStatus::Feasible;
                        break;
                    }
                }
                Err(ResolutionError::Infeasible) if incumbent.is_none() => {
                    let stats = stats(SolveStatus::Infeasible, Vec::new());
                    log_stats(&stats);
                    return Ok(SolveOutcome::Infeasible(stats));
                }
                Err(e) if incumbent.is_none() => {
                    return Err(PlanError::Solver(e.to_string()));
                }
                Err(e) => {
                    warn!(stage, error = %e, "objective stage failed, keeping previous assignment");
                    status = SolveStatus::Feasible;
                    break;
                }
            }
        }

        let Some(values) = incumbent else {
            return Err(PlanError::Solver("no objective stage was solved".into()));
        };
        let assignment = CellAssignment::new(
            values[..model.cell_count()]
                .iter()
                .map(|&v| v > 0.5)
                .collect(),
        );
        let stats = stats(status, reached.iter().map(|&(_, value)| value).collect());
        log_stats(&stats);
        Ok(SolveOutcome::Solved { assignment, stats })
    }
}

/// Values of every variable (cells, then aux) after one stage.
struct StageSolution {
    values: Vec<f64>,
    proven: bool,
}

/// Position of a model variable in the stage value vector.
fn var_index(model: &WateringModel, v: Var) -> usize {
    match v {
        Var::Cell(i) => i,
        Var::Aux(i) => model.cell_count() + i,
    }
}

/// Builds and solves the problem for one objective, with every earlier
/// objective held at its reached value.
fn solve_stage(
    model: &WateringModel,
    objective: &Objective,
    reached: &[(&Objective, f64)],
    warm_start: Option<&[f64]>,
    time_limit: Option<Duration>,
) -> std::result::Result<StageSolution, ResolutionError> {
    let mut vars = ProblemVariables::new();
    let mut all: Vec<Variable> = (0..model.cell_count())
        .map(|i| vars.add(variable().binary().name(model.cell_name(i))))
        .collect();
    all.extend(model.aux_vars().iter().map(|a| {
        vars.add(
            variable()
                .min(a.lower as f64)
                .max(a.upper as f64)
                .name(a.name.clone()),
        )
    }));
    let lookup = |v: Var| all[var_index(model, v)];
    let expression = |o: &Objective| {
        let mut e = Expression::from(o.constant);
        for &(v, coeff) in &o.terms {
            e += coeff * lookup(v);
        }
        e
    };

    let mut problem = vars.minimise(expression(objective)).using(microlp);
    for c in model.linear_constraints() {
        let mut lhs = Expression::from(0.0);
        for &(v, coeff) in &c.terms {
            lhs += coeff as f64 * lookup(v);
        }
        let rhs = c.rhs as f64;
        problem = problem.with(match c.cmp {
            Comparison::Le => constraint::leq(lhs, rhs),
            Comparison::Ge => constraint::geq(lhs, rhs),
            Comparison::Eq => constraint::eq(lhs, rhs),
        });
    }
    for imp in model.implications() {
        let (from, to) = (all[imp.from], all[imp.to]);
        problem = problem.with(if imp.negated {
            constraint::leq(from + to, 1.0)
        } else {
            constraint::geq(to - from, 0.0)
        });
    }
    for &(earlier, value) in reached {
        problem = problem.with(constraint::leq(expression(earlier), value + FIX_TOLERANCE));
    }
    if let Some(limit) = time_limit {
        problem = problem.with_time_limit(limit.as_secs_f64());
    }
    if let Some(values) = warm_start {
        problem = problem.with_initial_solution(all.iter().copied().zip(values.iter().copied()));
    }

    let solution = problem.solve()?;
    Ok(StageSolution {
        values: all.iter().map(|&v| solution.value(v)).collect(),
        proven: matches!(solution.status(), SolutionStatus::Optimal),
    })
}

fn log_stats(stats: &SolveStats) {
    info!(
        status = ?stats.status,
        objectives = ?stats.objectives,
        variables = stats.variables,
        constraints = stats.constraints,
        wall_time_ms = stats.wall_time.as_millis() as u64,
        "solve finished"
    );
}
