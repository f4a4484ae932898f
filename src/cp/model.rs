//! Solver-independent watering model.
//!
//! Holds the boolean cell grid, bounded auxiliary variables, linear
//! constraints, implications between cells, and one or more minimisation
//! objectives in priority order. Any [`ScheduleSolver`](super::ScheduleSolver)
//! can consume it.
//!
//! Cells are addressed by a dense index:
//! `((zone × num_days) + day) × daily_slots + slot`.

/// A model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    /// Boolean cell: zone watered at (day, slot).
    Cell(usize),
    /// Bounded auxiliary variable used by the objective.
    Aux(usize),
}

/// A bounded auxiliary variable.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxVar {
    pub name: String,
    pub lower: i64,
    pub upper: i64,
}

/// Relation between the left-hand side and the constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Le,
    Ge,
    Eq,
}

/// Which rule a constraint encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    SlotCapacity,
    GroupBalance,
    FrequencyTarget,
    LoadEvenness,
    GroupEvenness,
    SplashOverlap,
}

/// `Σ coeff × var  (cmp)  rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub kind: ConstraintKind,
    pub terms: Vec<(Var, i64)>,
    pub cmp: Comparison,
    pub rhs: i64,
}

impl LinearConstraint {
    /// Evaluates the constraint for given variable values.
    pub fn is_satisfied_by(&self, value: impl Fn(Var) -> i64) -> bool {
        let lhs: i64 = self.terms.iter().map(|&(v, c)| c * value(v)).sum();
        match self.cmp {
            Comparison::Le => lhs <= self.rhs,
            Comparison::Ge => lhs >= self.rhs,
            Comparison::Eq => lhs == self.rhs,
        }
    }
}

/// `cell[from] → cell[to]` (or `→ ¬cell[to]` when `negated`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Implication {
    pub from: usize,
    pub to: usize,
    pub negated: bool,
}

impl Implication {
    pub fn is_satisfied_by(&self, cells: &[bool]) -> bool {
        !cells[self.from] || (cells[self.to] != self.negated)
    }
}

/// Minimise `constant + Σ coeff × var`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Objective {
    pub terms: Vec<(Var, f64)>,
    pub constant: f64,
}

impl Objective {
    /// Value of the objective for given variable values.
    pub fn evaluate(&self, value: impl Fn(Var) -> f64) -> f64 {
        self.constant + self.terms.iter().map(|&(v, c)| c * value(v)).sum::<f64>()
    }

    /// Sum of two objectives.
    pub fn merge(mut self, other: Objective) -> Self {
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }
}

/// The complete decision model of one planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct WateringModel {
    num_zones: usize,
    num_days: usize,
    daily_slots: usize,
    aux: Vec<AuxVar>,
    linear: Vec<LinearConstraint>,
    implications: Vec<Implication>,
    objectives: Vec<Objective>,
    contradictions: Vec<ConstraintKind>,
}

impl WateringModel {
    /// Creates a model with `num_zones × num_days × daily_slots` cells and
    /// no constraints.
    pub fn new(num_zones: usize, num_days: usize, daily_slots: usize) -> Self {
        Self {
            num_zones,
            num_days,
            daily_slots,
            aux: Vec::new(),
            linear: Vec::new(),
            implications: Vec::new(),
            objectives: Vec::new(),
            contradictions: Vec::new(),
        }
    }

    /// Dense index of the (zone, day, slot) cell.
    #[inline]
    pub fn cell(&self, zone: usize, day: usize, slot: usize) -> usize {
        debug_assert!(zone < self.num_zones && day < self.num_days && slot < self.daily_slots);
        (zone * self.num_days + day) * self.daily_slots + slot
    }

    /// (zone, day, slot) of a dense cell index.
    #[inline]
    pub fn cell_coords(&self, index: usize) -> (usize, usize, usize) {
        let slot = index % self.daily_slots;
        let rest = index / self.daily_slots;
        (rest / self.num_days, rest % self.num_days, slot)
    }

    /// Stable name of a cell variable.
    pub fn cell_name(&self, index: usize) -> String {
        let (l, d, s) = self.cell_coords(index);
        format!("slot_l{l}d{d}s{s}")
    }

    pub fn num_zones(&self) -> usize {
        self.num_zones
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    pub fn daily_slots(&self) -> usize {
        self.daily_slots
    }

    /// Number of boolean cell variables.
    pub fn cell_count(&self) -> usize {
        self.num_zones * self.num_days * self.daily_slots
    }

    /// Declares an auxiliary variable bounded to `[lower, upper]`.
    pub fn add_aux(&mut self, name: impl Into<String>, lower: i64, upper: i64) -> Var {
        self.aux.push(AuxVar {
            name: name.into(),
            lower,
            upper,
        });
        Var::Aux(self.aux.len() - 1)
    }

    /// Adds a linear constraint.
    ///
    /// Zero-coefficient terms are dropped. A constraint left without terms
    /// is decided on the spot: if `0 (cmp) rhs` is false the model is
    /// marked contradictory, otherwise the constraint is discarded.
    pub fn add_linear(
        &mut self,
        kind: ConstraintKind,
        terms: Vec<(Var, i64)>,
        cmp: Comparison,
        rhs: i64,
    ) {
        let terms: Vec<(Var, i64)> = terms.into_iter().filter(|&(_, c)| c != 0).collect();
        let constraint = LinearConstraint {
            kind,
            terms,
            cmp,
            rhs,
        };
        if constraint.terms.is_empty() {
            if !constraint.is_satisfied_by(|_| 0) {
                self.contradictions.push(kind);
            }
            return;
        }
        self.linear.push(constraint);
    }

    /// `cell[from] → cell[to]`
    pub fn add_implication(&mut self, from: usize, to: usize) {
        self.implications.push(Implication {
            from,
            to,
            negated: false,
        });
    }

    /// `cell[from] → ¬cell[to]`
    pub fn add_exclusion(&mut self, from: usize, to: usize) {
        self.implications.push(Implication {
            from,
            to,
            negated: true,
        });
    }

    /// Replaces all objectives with a single one.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objectives = vec![objective];
    }

    /// Appends an objective below every objective already declared.
    ///
    /// Solvers optimise objectives in declaration order, each one only
    /// among the optima of those before it.
    pub fn push_objective(&mut self, objective: Objective) {
        self.objectives.push(objective);
    }

    pub fn aux_vars(&self) -> &[AuxVar] {
        &self.aux
    }

    pub fn linear_constraints(&self) -> &[LinearConstraint] {
        &self.linear
    }

    pub fn implications(&self) -> &[Implication] {
        &self.implications
    }

    /// Objectives in priority order. Empty for a pure feasibility model.
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Total constraints (linear + implications).
    pub fn constraint_count(&self) -> usize {
        self.linear.len() + self.implications.len()
    }

    /// Linear constraints of one kind.
    pub fn count_of(&self, kind: ConstraintKind) -> usize {
        self.linear.iter().filter(|c| c.kind == kind).count()
    }

    /// Whether a constraint without variables was already false.
    pub fn is_trivially_infeasible(&self) -> bool {
        !self.contradictions.is_empty()
    }

    /// Kinds of the constraints found contradictory while building.
    pub fn contradictions(&self) -> &[ConstraintKind] {
        &self.contradictions
    }

    /// Checks every hard rule (linear constraints of hard kinds and all
    /// implications) against a cell assignment.
    pub fn satisfies_hard_constraints(&self, cells: &[bool]) -> bool {
        if cells.len() != self.cell_count() || self.is_trivially_infeasible() {
            return false;
        }
        let value = |v: Var| match v {
            Var::Cell(i) => i64::from(cells[i]),
            Var::Aux(_) => 0,
        };
        self.linear
            .iter()
            .filter(|c| c.kind.is_hard())
            .all(|c| c.is_satisfied_by(value))
            && self.implications.iter().all(|i| i.is_satisfied_by(cells))
    }
}

impl ConstraintKind {
    /// Whether the constraint is a feasibility rule rather than part of a
    /// soft goal's auxiliary encoding.
    pub fn is_hard(self) -> bool {
        matches!(
            self,
            Self::SlotCapacity | Self::GroupBalance | Self::FrequencyTarget
        )
    }
}
