//! # Error Types
//!
//! Domain-specific error types for pos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pos-core errors (this file)                                           │
//! │  ├── CoreError        - Report / money / revenue rule failures         │
//! │  ├── ValidationError  - One field failing one rule                     │
//! │  └── FieldErrors      - Every failing field of a request body          │
//! │                                                                         │
//! │  pos-db errors (separate crate)                                        │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  api-server errors                                                     │
//! │  ├── ServiceError     - Tagged result of every service call            │
//! │  └── ApiError         - HTTP status + JSON body                        │
//! │                                                                         │
//! │  Flow: ValidationError → FieldErrors → ServiceError → ApiError         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule failures that are not tied to a single request field.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Excel export requested without customer, month or year.
    #[error("Please select at least one criterion: Customer ID, Month, or Year.")]
    MissingReportCriteria,

    /// `revenueBy` is not one of day, month, year.
    #[error("Unknown revenue period '{0}': expected day, month or year")]
    UnknownRevenuePeriod(String),

    /// A computed amount left the range of i64 cents.
    #[error("Amount is too large: {0}")]
    AmountOverflow(String),

    /// A decimal amount could not be converted to cents.
    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }

    /// Re-labels the error with a new field path (e.g. `items[2].quantity`).
    pub fn at(self, path: impl Into<String>) -> Self {
        let field = path.into();
        match self {
            ValidationError::Required { .. } => ValidationError::Required { field },
            ValidationError::TooLong { max, .. } => ValidationError::TooLong { field, max },
            ValidationError::OutOfRange { min, max, .. } => {
                ValidationError::OutOfRange { field, min, max }
            }
            ValidationError::MustBePositive { .. } => ValidationError::MustBePositive { field },
            ValidationError::InvalidFormat { reason, .. } => {
                ValidationError::InvalidFormat { field, reason }
            }
            ValidationError::NotAllowed { allowed, .. } => {
                ValidationError::NotAllowed { field, allowed }
            }
        }
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// One failing field, as serialized in an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        FieldError {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Every failing field of a request, collected rather than short-circuited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(Vec::new())
    }

    /// Records the error of a failed check, if any.
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) {
        if let Err(err) = result {
            self.0.push(FieldError::from(&err));
        }
    }

    pub fn push(&mut self, err: ValidationError) {
        self.0.push(FieldError::from(&err));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_criteria_message() {
        assert_eq!(
            CoreError::MissingReportCriteria.to_string(),
            "Please select at least one criterion: Customer ID, Month, or Year."
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_relabel_keeps_rule() {
        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .at("items[1].quantity");
        assert_eq!(err.to_string(), "items[1].quantity must be positive");
    }

    #[test]
    fn test_field_errors_collects_all() {
        let mut errors = FieldErrors::new();
        errors.check::<()>(Ok(()));
        errors.check::<()>(Err(ValidationError::Required {
            field: "name".to_string(),
        }));
        errors.push(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });

        let err = errors.into_result().unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(err.0[0].field, "name");
        assert_eq!(err.0[1].message, "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
