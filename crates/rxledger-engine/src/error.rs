//! # API Error Type
//!
//! The one error type engine callers see.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in rxledger                               │
//! │                                                                         │
//! │  Caller                      Engine                                     │
//! │  ──────                      ──────                                     │
//! │                                                                         │
//! │  purchases().create(..)                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  IdentityContext blank? ─────────────── MISSING_CONTEXT ───────►│  │
//! │  │         │                                                        │  │
//! │  │  ValidationError? ───────────────────── VALIDATION_ERROR ──────►│  │
//! │  │         │                                                        │  │
//! │  │  CoreError::InvalidTransition? ──────── INVALID_TRANSITION ────►│  │
//! │  │         │                                                        │  │
//! │  │  DbError::NotFound? ─────────────────── NOT_FOUND ─────────────►│  │
//! │  │  DbError::* (logged, generic text) ──── PERSISTENCE_ERROR ─────►│  │
//! │  │         │                                                        │  │
//! │  │  Document saved, follow-up failed ───── PARTIAL_WRITE ─────────►│  │
//! │  │         │                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! `ApiError` serializes as `{ "code": "NOT_FOUND", "message": "..." }`, and
//! [`ApiResponse`] wraps any result in a `{ success, data, error }` envelope.

use serde::Serialize;
use tracing::error;

use rxledger_core::{CoreError, ValidationError};
use rxledger_db::DbError;

/// Error returned from every engine operation.
///
/// ```json
/// {
///   "code": "INVALID_TRANSITION",
///   "message": "Purchase order po-1 cannot move from cancelled to received"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input failed validation; nothing was written.
    ValidationError,

    /// Document or reference row is absent from the caller's scope.
    NotFound,

    /// Purchase order status change not allowed by the lifecycle.
    InvalidTransition,

    /// The ledger store rejected or failed an operation.
    PersistenceError,

    /// The primary document was written but a follow-up write failed.
    PartialWrite,

    /// Tenant, branch or user missing from the identity context.
    MissingContext,

    /// Store failure sqlx could not classify (decode errors, protocol faults).
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn missing_context(field: &str) -> Self {
        ApiError::new(
            ErrorCode::MissingContext,
            format!("Identity context is missing {}", field),
        )
    }

    /// The document exists, but some follow-up writes did not land.
    pub fn partial_write(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PartialWrite, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts store errors to API errors.
///
/// Only `NotFound` keeps its detail; everything else is logged and
/// surfaced with a generic message. Unclassified failures become `INTERNAL`.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { constraint } => {
                error!("Unique constraint violated: {}", constraint);
                ApiError::new(ErrorCode::PersistenceError, "Duplicate document number or key")
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::PersistenceError, "Invalid reference")
            }
            DbError::CheckViolation(message) => {
                error!("Check constraint violated: {}", message);
                ApiError::new(ErrorCode::PersistenceError, "Rejected by ledger constraints")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::PersistenceError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::PersistenceError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::PersistenceError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::PersistenceError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::PersistenceError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::internal("Unexpected ledger store error")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            e @ CoreError::InvalidTransition { .. } => {
                ApiError::new(ErrorCode::InvalidTransition, e.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Convenience type alias for engine results.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Response Envelope
// =============================================================================

/// Uniform `{ success, data, error }` envelope for callers that want one
/// shape for every outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T> From<ApiResult<T>> for ApiResponse<T> {
    fn from(result: ApiResult<T>) -> Self {
        match result {
            Ok(data) => ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(error) => ApiResponse {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}
