//! Error types for planning runs.
//!
//! Infeasibility is not an error: a model with no satisfying
//! assignment is a regular [`PlanOutcome`](crate::planner::PlanOutcome).

use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid zone set: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    #[error("Solver failure: {0}")]
    Solver(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

impl From<Vec<ValidationError>> for PlanError {
    fn from(errors: Vec<ValidationError>) -> Self {
        PlanError::Validation(errors)
    }
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_validation_message_joins_all_errors() {
        let err = PlanError::from(vec![
            ValidationError::new(ValidationErrorKind::DuplicateName, "Duplicate zone name: lawn"),
            ValidationError::new(ValidationErrorKind::InvalidInterval, "Zone 'roses' has interval 0"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("Invalid zone set: "));
        assert!(text.contains("Duplicate zone name: lawn; Zone 'roses' has interval 0"));
    }

    #[test]
    fn test_config_message() {
        let err = PlanError::Config("daily_slots is missing".into());
        assert_eq!(err.to_string(), "Invalid configuration: daily_slots is missing");
    }
}
