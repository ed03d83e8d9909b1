//! # Error Types
//!
//! Failures raised by pure ledger rules, before anything touches the store.
//!
//! - [`ValidationError`]: a field of a request is unusable
//! - [`CoreError`]: a lifecycle rule refused the operation
//!
//! Both end up as an `ApiError` in rxledger-engine, next to the store's
//! `DbError`.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced document or reference-data row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A purchase order status change the lifecycle does not allow.
    ///
    /// ## When This Occurs
    /// - Receiving a cancelled order
    /// - Moving a returned order anywhere
    /// - Editing a cancelled order
    #[error("Purchase order {id} cannot move from {from} to {to}")]
    InvalidTransition { id: String, from: String, to: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any write happens, so a failed validation never leaves
/// partial state behind.
#[derive(Debug, Error)]
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

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// A collection that needs at least one entry is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// Invalid format (e.g., invalid UUID, unknown status).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }

    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::Negative {
            field: field.into(),
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
    fn test_error_messages() {
        let err = CoreError::InvalidTransition {
            id: "po-1".to_string(),
            from: "cancelled".to_string(),
            to: "received".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Purchase order po-1 cannot move from cancelled to received"
        );

        let err = CoreError::not_found("Sale", "abc");
        assert_eq!(err.to_string(), "Sale not found: abc");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("supplier_id").to_string(),
            "supplier_id is required"
        );
        assert_eq!(
            ValidationError::negative("discount").to_string(),
            "discount must not be negative"
        );
        let err = ValidationError::Empty {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items must contain at least one entry");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("items").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
