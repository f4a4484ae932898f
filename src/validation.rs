//! Input validation for planning runs.
//!
//! Checks the zone set and planner configuration before any model is
//! built. Detects:
//! - Empty zone sets
//! - Duplicate zone names
//! - Non-positive intervals and durations
//! - A zero slot count
//! - Splash references to unknown zones
//!
//! Every problem is collected, so one run reports all of them at once.

use std::collections::HashSet;

use tracing::warn;

use crate::models::Zone;
use crate::settings::PlannerConfig;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No zones were supplied.
    EmptyZoneSet,
    /// Two zones share the same name.
    DuplicateName,
    /// A zone's interval is zero.
    InvalidInterval,
    /// A zone's duration is zero.
    InvalidDuration,
    /// The configuration asks for zero slots per day.
    InvalidSlotCount,
    /// A splash set names a zone that doesn't exist.
    UnknownSplashZone,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the zone set and configuration of a planning run.
///
/// Checks:
/// 1. At least one zone
/// 2. At least one slot per day
/// 3. No duplicate zone names
/// 4. Every interval and duration is positive
/// 5. Every splash reference names a declared zone
///
/// A zone listing itself as a splash neighbour is tolerated (it is already
/// counted once) and only logged.
///
/// `slot_minutes` is not checked: a zero budget is a legal input whose
/// outcome is "no schedule".
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_zones(zones: &[Zone], config: &PlannerConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if zones.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyZoneSet,
            "No zones to schedule",
        ));
    }

    if config.daily_slots == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSlotCount,
            "daily_slots must be at least 1",
        ));
    }

    let mut names = HashSet::new();
    for zone in zones {
        if !names.insert(zone.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate zone name: {}", zone.name),
            ));
        }

        if zone.interval == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!("Zone '{}' has interval 0", zone.name),
            ));
        }

        if zone.duration == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("Zone '{}' has duration 0", zone.name),
            ));
        }
    }

    // Splash references, checked once all names are known
    for zone in zones {
        for other in &zone.splash {
            if other == &zone.name {
                warn!(zone = %zone.name, "zone lists itself as a splash neighbour");
            } else if !names.contains(other.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSplashZone,
                    format!("Zone '{}' references unknown splash zone '{}'", zone.name, other),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ZoneGroup;

    fn sample_zones() -> Vec<Zone> {
        vec![
            Zone::new("lawn", 1, 10, ZoneGroup::A).with_splash("beds"),
            Zone::new("beds", 1, 10, ZoneGroup::B),
            Zone::new("hedge", 2, 5, ZoneGroup::B),
        ]
    }

    fn config() -> PlannerConfig {
        PlannerConfig::new(2, 20)
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_zones(&sample_zones(), &config()).is_ok());
    }

    #[test]
    fn test_zero_slot_minutes_is_valid() {
        assert!(validate_zones(&sample_zones(), &PlannerConfig::new(2, 0)).is_ok());
    }

    #[test]
    fn test_empty_zone_set() {
        let errors = validate_zones(&[], &config()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyZoneSet));
    }

    #[test]
    fn test_zero_slots() {
        let errors = validate_zones(&sample_zones(), &PlannerConfig::new(0, 20)).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidSlotCount));
    }

    #[test]
    fn test_duplicate_name() {
        let mut zones = sample_zones();
        zones.push(Zone::new("lawn", 3, 10, ZoneGroup::A));
        let errors = validate_zones(&zones, &config()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateName && e.message.contains("lawn")));
    }

    #[test]
    fn test_zero_interval_and_duration() {
        let zones = vec![
            Zone::new("a", 0, 10, ZoneGroup::A),
            Zone::new("b", 1, 0, ZoneGroup::B),
        ];
        let errors = validate_zones(&zones, &config()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidInterval));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidDuration));
    }

    #[test]
    fn test_unknown_splash_zone() {
        let zones = vec![
            Zone::new("a", 1, 10, ZoneGroup::A).with_splash("ghost"),
            Zone::new("b", 1, 10, ZoneGroup::B),
        ];
        let errors = validate_zones(&zones, &config()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownSplashZone);
        assert!(errors[0].message.contains("ghost"));
    }

    #[test]
    fn test_self_splash_tolerated() {
        let zones = vec![
            Zone::new("a", 1, 10, ZoneGroup::A).with_splash("a"),
            Zone::new("b", 1, 10, ZoneGroup::B),
        ];
        assert!(validate_zones(&zones, &config()).is_ok());
    }

    #[test]
    fn test_multiple_errors() {
        let zones = vec![
            Zone::new("a", 0, 0, ZoneGroup::A).with_splash("missing"),
            Zone::new("a", 1, 10, ZoneGroup::B),
        ];
        let errors = validate_zones(&zones, &PlannerConfig::new(0, 10)).unwrap_err();
        assert!(errors.len() >= 5);
    }
}
