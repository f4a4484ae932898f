//! Translates zones, configuration and cycle into a [`WateringModel`].

use std::collections::HashMap;

use tracing::debug;

use super::model::{Comparison, ConstraintKind, Objective, Var, WateringModel};
use crate::cycle::Cycle;
use crate::error::{PlanError, Result};
use crate::models::{Zone, ZoneGroup};
use crate::settings::{ObjectiveStrategy, PlannerConfig};

/// Builds the watering model from validated inputs.
///
/// # Example
/// ```
/// use sprinkler_plan::cp::WateringModelBuilder;
/// use sprinkler_plan::cycle::Cycle;
/// use sprinkler_plan::models::{Zone, ZoneGroup};
/// use sprinkler_plan::settings::PlannerConfig;
///
/// let zones = vec![
///     Zone::new("lawn", 1, 10, ZoneGroup::A),
///     Zone::new("beds", 1, 10, ZoneGroup::B),
/// ];
/// let config = PlannerConfig::new(2, 20);
/// let cycle = Cycle::compute(&zones, config.daily_slots).unwrap();
/// let model = WateringModelBuilder::new(&zones, &config, &cycle).build().unwrap();
/// assert_eq!(model.cell_count(), 8);
/// ```
pub struct WateringModelBuilder<'a> {
    zones: &'a [Zone],
    config: &'a PlannerConfig,
    cycle: &'a Cycle,
}

impl<'a> WateringModelBuilder<'a> {
    /// Creates a new builder.
    pub fn new(zones: &'a [Zone], config: &'a PlannerConfig, cycle: &'a Cycle) -> Self {
        Self {
            zones,
            config,
            cycle,
        }
    }

    /// Builds the model.
    ///
    /// Creates:
    /// - One boolean per (zone, day, slot)
    /// - Slot capacity, group balance and frequency target constraints
    /// - Interval spacing implications with slot rotation
    /// - Auxiliary variables and the objective for the enabled soft goals
    ///
    /// Fails if a splash reference cannot be resolved.
    pub fn build(&self) -> Result<WateringModel> {
        let splash = self.resolve_splash()?;
        let mut model = WateringModel::new(
            self.zones.len(),
            self.cycle.num_days,
            self.cycle.daily_slots,
        );

        self.add_slot_capacity(&mut model);
        self.add_group_balance(&mut model);
        self.add_frequency_targets(&mut model);
        self.add_interval_spacing(&mut model);
        self.add_objective(&mut model, &splash);

        debug!(
            cells = model.cell_count(),
            constraints = model.constraint_count(),
            implications = model.implications().len(),
            "watering model built"
        );
        Ok(model)
    }

    /// Resolves every zone's splash names to zone indices, once.
    ///
    /// Self references are dropped.
    fn resolve_splash(&self) -> Result<Vec<Vec<usize>>> {
        let index: HashMap<&str, usize> = self
            .zones
            .iter()
            .enumerate()
            .map(|(i, z)| (z.name.as_str(), i))
            .collect();

        self.zones
            .iter()
            .map(|zone| {
                zone.splash
                    .iter()
                    .filter(|name| name.as_str() != zone.name)
                    .map(|name| {
                        index.get(name.as_str()).copied().ok_or_else(|| {
                            PlanError::Config(format!(
                                "zone '{}' references unknown splash zone '{name}'",
                                zone.name
                            ))
                        })
                    })
                    .collect::<Result<Vec<usize>>>()
            })
            .collect()
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let slots = self.cycle.daily_slots;
        (0..self.cycle.num_days).flat_map(move |d| (0..slots).map(move |s| (d, s)))
    }

    /// `duration × cell` terms of the zones selected by `filter` in one cell.
    fn load_terms(
        &self,
        model: &WateringModel,
        day: usize,
        slot: usize,
        filter: impl Fn(&Zone) -> bool,
    ) -> Vec<(Var, i64)> {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, z)| filter(z))
            .map(|(l, z)| (Var::Cell(model.cell(l, day, slot)), i64::from(z.duration)))
            .collect()
    }

    // Σ duration ≤ slot_minutes, per cell
    fn add_slot_capacity(&self, model: &mut WateringModel) {
        let budget = i64::from(self.config.slot_minutes);
        for (d, s) in self.cells() {
            let terms = self.load_terms(model, d, s, |_| true);
            model.add_linear(ConstraintKind::SlotCapacity, terms, Comparison::Le, budget);
        }
    }

    // 0 < Σ duration(group) ≤ slot_minutes / 2, per cell and group
    fn add_group_balance(&self, model: &mut WateringModel) {
        let limit = i64::from(self.config.group_limit());
        for (d, s) in self.cells() {
            for group in ZoneGroup::ALL {
                let terms = self.load_terms(model, d, s, |z| z.group == group);
                model.add_linear(
                    ConstraintKind::GroupBalance,
                    terms.clone(),
                    Comparison::Ge,
                    1,
                );
                model.add_linear(ConstraintKind::GroupBalance, terms, Comparison::Le, limit);
            }
        }
    }

    // Σ cells(zone) == target, per zone
    fn add_frequency_targets(&self, model: &mut WateringModel) {
        for (l, &target) in self.cycle.targets.iter().enumerate() {
            let terms = self
                .cells()
                .map(|(d, s)| (Var::Cell(model.cell(l, d, s)), 1))
                .collect();
            model.add_linear(
                ConstraintKind::FrequencyTarget,
                terms,
                Comparison::Eq,
                target as i64,
            );
        }
    }

    /// A watering at (d, s) implies one at (d + interval, (s + 1) mod slots)
    /// and excludes every cell strictly between the two. Pairs reaching past
    /// the horizon are omitted.
    fn add_interval_spacing(&self, model: &mut WateringModel) {
        let num_days = self.cycle.num_days;
        let slots = self.cycle.daily_slots;

        for (d, s) in self.cells() {
            for (l, zone) in self.zones.iter().enumerate() {
                let from = model.cell(l, d, s);
                let next_d = d + zone.interval as usize;
                let next_s = (s + 1) % slots;
                if next_d < num_days {
                    let to = model.cell(l, next_d, next_s);
                    model.add_implication(from, to);
                }

                let (mut nd, mut ns) = (d, s);
                loop {
                    ns += 1;
                    if ns == slots {
                        ns = 0;
                        nd += 1;
                    }
                    if (nd, ns) == (next_d, next_s) || nd >= num_days {
                        break;
                    }
                    let to = model.cell(l, nd, ns);
                    model.add_exclusion(from, to);
                }
            }
        }
    }

    /// Declares the enabled soft goals and turns them into objectives.
    ///
    /// `Lexicographic` gives each goal its own objective, in priority
    /// order; the other strategies fold the goals into one.
    fn add_objective(&self, model: &mut WateringModel, splash: &[Vec<usize>]) {
        let strategy = self.config.solver.objective;
        let weights = GoalWeights::for_strategy(strategy);
        let budget = i64::from(self.config.slot_minutes);
        let mut goals = Vec::with_capacity(3);

        // Maximise the least loaded slot: min_load ≤ load(cell)
        if weights.load != 0.0 {
            let bound = self.min_load_bound();
            let min_load = model.add_aux("min_load", 0, bound);
            for (d, s) in self.cells() {
                let mut terms = vec![(min_load, 1)];
                terms.extend(
                    self.load_terms(model, d, s, |_| true)
                        .into_iter()
                        .map(|(v, c)| (v, -c)),
                );
                model.add_linear(ConstraintKind::LoadEvenness, terms, Comparison::Le, 0);
            }
            goals.push(Objective {
                terms: vec![(min_load, -weights.load)],
                constant: weights.load * bound as f64,
            });
        }

        // Minimise the largest |A − B| over all slots
        if weights.balance != 0.0 {
            let max_imbalance = model.add_aux("max_imbalance", 0, budget);
            for (d, s) in self.cells() {
                let a = self.load_terms(model, d, s, |z| z.group == ZoneGroup::A);
                let b = self.load_terms(model, d, s, |z| z.group == ZoneGroup::B);
                for (plus, minus) in [(&a, &b), (&b, &a)] {
                    let mut terms = plus.clone();
                    terms.extend(minus.iter().map(|&(v, c)| (v, -c)));
                    terms.push((max_imbalance, -1));
                    model.add_linear(ConstraintKind::GroupEvenness, terms, Comparison::Le, 0);
                }
            }
            goals.push(Objective {
                terms: vec![(max_imbalance, weights.balance)],
                constant: 0.0,
            });
        }

        // Minimise the largest number of mutually splashing zones running together
        if weights.splash != 0.0 && splash.iter().any(|n| !n.is_empty()) {
            let max_splash = model.add_aux("max_splash", 0, self.zones.len() as i64);
            for (l, neighbours) in splash.iter().enumerate() {
                if neighbours.is_empty() {
                    continue;
                }
                for (d, s) in self.cells() {
                    let mut terms = vec![(Var::Cell(model.cell(l, d, s)), 1)];
                    terms.extend(
                        neighbours
                            .iter()
                            .map(|&n| (Var::Cell(model.cell(n, d, s)), 1)),
                    );
                    terms.push((max_splash, -1));
                    model.add_linear(ConstraintKind::SplashOverlap, terms, Comparison::Le, 0);
                }
            }
            goals.push(Objective {
                terms: vec![(max_splash, weights.splash)],
                constant: 0.0,
            });
        }

        match strategy {
            ObjectiveStrategy::Lexicographic => {
                for goal in goals {
                    model.push_objective(goal);
                }
            }
            _ if !goals.is_empty() => {
                model.set_objective(goals.into_iter().fold(Objective::default(), Objective::merge));
            }
            _ => {}
        }
    }

    /// Highest value the least loaded slot can reach.
    ///
    /// Frequency targets fix the total minutes of the horizon, so no slot
    /// minimum exceeds the average load. Every load is a multiple of the
    /// durations' gcd, which rounds the average down further.
    fn min_load_bound(&self) -> i64 {
        let budget = i64::from(self.config.slot_minutes);
        let cells = self.cycle.cell_count() as i64;
        if cells == 0 {
            return 0;
        }
        let total: i64 = self
            .zones
            .iter()
            .zip(&self.cycle.targets)
            .map(|(z, &t)| i64::from(z.duration) * t as i64)
            .sum();
        let step = self
            .zones
            .iter()
            .map(|z| i64::from(z.duration))
            .fold(0, gcd)
            .max(1);
        (total / cells / step * step).min(budget)
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Objective coefficients of the three soft goals.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GoalWeights {
    load: f64,
    balance: f64,
    splash: f64,
}

impl GoalWeights {
    /// A zero weight leaves the goal out of the model.
    fn for_strategy(strategy: ObjectiveStrategy) -> Self {
        match strategy {
            ObjectiveStrategy::Lexicographic => Self {
                load: 1.0,
                balance: 1.0,
                splash: 1.0,
            },
            ObjectiveStrategy::Weighted {
                load,
                balance,
                splash,
            } => Self {
                load,
                balance,
                splash,
            },
            ObjectiveStrategy::SplashOnly => Self {
                load: 0.0,
                balance: 0.0,
                splash: 1.0,
            },
        }
    }
}
