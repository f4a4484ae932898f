//! Planning configuration.
//!
//! Settings are read with the `config` crate from an INI or TOML file
//! (format chosen by extension):
//!
//! ```ini
//! [irrigation]
//! daily_slots = 2
//! slot_minutes = 60
//! program_name_prefix = Auto
//! slot_1_name = morning
//! slot_1_time = 300
//! slot_2_name = evening
//! slot_2_time = 1200
//!
//! [solver]
//! time_limit_secs = 30
//! objective = lexicographic
//! ```
//!
//! Only `daily_slots`, `slot_minutes` and the `[solver]` section affect
//! the planner; the remaining keys feed controller program generation.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PlanError, Result};

/// Parameters of one planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Slots per day (≥ 1).
    pub daily_slots: u32,
    /// Watering budget of a single slot, in minutes.
    pub slot_minutes: u32,
    /// Options handed through to the solver.
    pub solver: SolverOptions,
}

/// Solver pass-through options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolverOptions {
    /// Wall-clock limit for the search. `None` = solver default.
    pub time_limit: Option<Duration>,
    /// How the soft goals are combined into one objective.
    pub objective: ObjectiveStrategy,
}

/// How the three soft goals (load evenness, group balance, splash
/// overlap) become the single objective of the solve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ObjectiveStrategy {
    /// Load evenness first, then group balance, then splash overlap.
    #[default]
    Lexicographic,
    /// Weighted sum; each weight scales its goal's auxiliary variable.
    Weighted {
        load: f64,
        balance: f64,
        splash: f64,
    },
    /// Only splash overlap is optimized.
    SplashOnly,
}

impl FromStr for ObjectiveStrategy {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lexicographic" | "lex" => Ok(Self::Lexicographic),
            "weighted" => Ok(Self::Weighted {
                load: 1.0,
                balance: 1.0,
                splash: 1.0,
            }),
            "splash_only" | "splash" => Ok(Self::SplashOnly),
            other => Err(PlanError::Config(format!("unknown objective '{other}'"))),
        }
    }
}

impl fmt::Display for ObjectiveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexicographic => f.write_str("lexicographic"),
            Self::Weighted { .. } => f.write_str("weighted"),
            Self::SplashOnly => f.write_str("splash_only"),
        }
    }
}

impl PlannerConfig {
    /// Creates a configuration with default solver options.
    pub fn new(daily_slots: u32, slot_minutes: u32) -> Self {
        Self {
            daily_slots,
            slot_minutes,
            solver: SolverOptions::default(),
        }
    }

    /// Sets the solver time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.solver.time_limit = Some(limit);
        self
    }

    /// Sets the objective strategy.
    pub fn with_objective(mut self, objective: ObjectiveStrategy) -> Self {
        self.solver.objective = objective;
        self
    }

    /// Per-group budget within one slot.
    #[inline]
    pub fn group_limit(&self) -> u32 {
        self.slot_minutes / 2
    }
}

/// Naming and timing of generated controller programs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramSettings {
    /// Prefix of every generated program name (may be empty).
    pub name_prefix: String,
    /// One entry per daily slot, in slot order.
    pub slots: Vec<SlotSettings>,
}

/// Display name and start time of one daily slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSettings {
    /// Name used in program titles.
    pub name: String,
    /// Start time in minutes after midnight, if configured.
    pub start_minute: Option<u32>,
}

impl ProgramSettings {
    /// Default slot names (`slot 1`, `slot 2`, …) with no start times.
    pub fn with_default_slots(daily_slots: u32) -> Self {
        Self {
            name_prefix: String::new(),
            slots: (1..=daily_slots)
                .map(|n| SlotSettings {
                    name: format!("slot {n}"),
                    start_minute: None,
                })
                .collect(),
        }
    }

    /// Program name prefix including the separating space.
    pub fn prefix(&self) -> String {
        if self.name_prefix.is_empty() {
            String::new()
        } else {
            format!("{} ", self.name_prefix)
        }
    }
}

/// Everything read from a settings file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub planner: PlannerConfig,
    pub programs: ProgramSettings,
}

#[derive(Debug, Deserialize)]
struct IrrigationSection {
    daily_slots: Option<u32>,
    slot_minutes: Option<u32>,
    #[serde(default)]
    program_name_prefix: String,
}

#[derive(Debug, Default, Deserialize)]
struct SolverSection {
    time_limit_secs: Option<u64>,
    objective: Option<String>,
    load_weight: Option<f64>,
    balance_weight: Option<f64>,
    splash_weight: Option<f64>,
}

impl Settings {
    /// Loads settings from an INI or TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;
        Self::from_config(&source)
    }

    /// Extracts settings from an already built `config::Config`.
    pub fn from_config(source: &config::Config) -> Result<Self> {
        let irrigation: IrrigationSection = source
            .get("irrigation")
            .map_err(|e| PlanError::Config(format!("[irrigation] section: {e}")))?;
        let daily_slots = irrigation
            .daily_slots
            .ok_or_else(|| PlanError::Config("irrigation.daily_slots is missing".into()))?;
        let slot_minutes = irrigation
            .slot_minutes
            .ok_or_else(|| PlanError::Config("irrigation.slot_minutes is missing".into()))?;

        let solver_section: SolverSection = match source.get("solver") {
            Ok(section) => section,
            Err(config::ConfigError::NotFound(_)) => SolverSection::default(),
            Err(e) => return Err(PlanError::Config(format!("[solver] section: {e}"))),
        };

        let mut objective = match solver_section.objective.as_deref() {
            Some(name) => name.parse()?,
            None => ObjectiveStrategy::default(),
        };
        if let ObjectiveStrategy::Weighted {
            load,
            balance,
            splash,
        } = &mut objective
        {
            *load = solver_section.load_weight.unwrap_or(*load);
            *balance = solver_section.balance_weight.unwrap_or(*balance);
            *splash = solver_section.splash_weight.unwrap_or(*splash);
        }

        let planner = PlannerConfig {
            daily_slots,
            slot_minutes,
            solver: SolverOptions {
                time_limit: solver_section.time_limit_secs.map(Duration::from_secs),
                objective,
            },
        };

        let mut slots = Vec::with_capacity(daily_slots as usize);
        for n in 1..=daily_slots {
            let name = source
                .get_string(&format!("irrigation.slot_{n}_name"))
                .unwrap_or_else(|_| format!("slot {n}"));
            let start_minute = match source.get_int(&format!("irrigation.slot_{n}_time")) {
                Ok(minute) => Some(u32::try_from(minute).map_err(|_| {
                    PlanError::Config(format!("irrigation.slot_{n}_time is out of range"))
                })?),
                Err(config::ConfigError::NotFound(_)) => None,
                Err(e) => {
                    return Err(PlanError::Config(format!("irrigation.slot_{n}_time: {e}")))
                }
            };
            slots.push(SlotSettings { name, start_minute });
        }

        Ok(Self {
            planner,
            programs: ProgramSettings {
                name_prefix: irrigation.program_name_prefix,
                slots,
            },
        })
    }
}
