//! Configuration validation.
//!
//! Provides the [`Validate`] trait implemented by every configuration
//! section, so out-of-range values are rejected at load time rather than
//! surfacing as odd results later.

use thiserror::Error;

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Value out of range for {field}: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

/// Check that an integer setting lies within `min..=max`.
pub fn check_range(field: &str, value: i64, min: i64, max: i64) -> ValidationResult<()> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Collapse a list of errors into a single result.
pub fn collect_errors(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, true ; "lower bound")]
    #[test_case(50, true ; "upper bound")]
    #[test_case(0, false ; "below")]
    #[test_case(51, false ; "above")]
    fn test_check_range(value: i64, ok: bool) {
        assert_eq!(check_range("portfolio_size", value, 1, 50).is_ok(), ok);
    }

    #[test]
    fn test_collect_errors() {
        assert!(collect_errors(vec![]).is_ok());

        let single = collect_errors(vec![ValidationError::Conflict {
            reason: "x".into(),
        }]);
        assert!(matches!(single, Err(ValidationError::Conflict { .. })));

        let many = collect_errors(vec![
            ValidationError::Conflict { reason: "a".into() },
            ValidationError::Conflict { reason: "b".into() },
        ]);
        assert!(matches!(many, Err(ValidationError::Multiple(v)) if v.len() == 2));
    }

    #[test]
    fn test_out_of_range_message() {
        let err = check_range("portfolio_size", 0, 1, 50).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value out of range for portfolio_size: 0 (allowed 1..=50)"
        );
    }
}
