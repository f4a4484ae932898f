//! Irrigation zone (line) model.
//!
//! A zone is one independently switched irrigation circuit. Zones are
//! immutable planning inputs: created once per run from a zone source and
//! never changed by the planner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// An irrigation zone to be scheduled.
///
/// # Time Representation
/// `interval` is in days, `duration` in minutes. Both must be positive;
/// this is checked by [`validate_zones`](crate::validation::validate_zones)
/// before any model is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Unique zone name.
    pub name: String,
    /// Days between two waterings.
    pub interval: u32,
    /// Minutes per watering.
    pub duration: u32,
    /// Fairness group the zone belongs to.
    pub group: ZoneGroup,
    /// Names of zones whose spray overlaps this one when run together.
    #[serde(default)]
    pub splash: BTreeSet<String>,
}

/// The two fairness categories balanced inside every slot.
///
/// Serialized as `"A"` / `"B"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneGroup {
    A,
    B,
}

impl ZoneGroup {
    /// Both groups, in display order.
    pub const ALL: [ZoneGroup; 2] = [ZoneGroup::A, ZoneGroup::B];

    /// The opposite group.
    pub fn other(self) -> Self {
        match self {
            ZoneGroup::A => ZoneGroup::B,
            ZoneGroup::B => ZoneGroup::A,
        }
    }
}

impl fmt::Display for ZoneGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneGroup::A => f.write_str("A"),
            ZoneGroup::B => f.write_str("B"),
        }
    }
}

impl FromStr for ZoneGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(ZoneGroup::A),
            "B" | "b" => Ok(ZoneGroup::B),
            other => Err(format!("unknown zone group '{other}' (expected A or B)")),
        }
    }
}

impl Zone {
    /// Creates a zone with an empty splash set.
    pub fn new(name: impl Into<String>, interval: u32, duration: u32, group: ZoneGroup) -> Self {
        Self {
            name: name.into(),
            interval,
            duration,
            group,
            splash: BTreeSet::new(),
        }
    }

    /// Adds one splash neighbour.
    pub fn with_splash(mut self, other: impl Into<String>) -> Self {
        self.splash.insert(other.into());
        self
    }

    /// Replaces the splash set.
    pub fn with_splash_set<I, S>(mut self, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.splash = others.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `other` is declared as overlapping with this zone.
    pub fn splashes(&self, other: &str) -> bool {
        self.splash.contains(other)
    }
}
