//! # Ledger Store Error Types
//!
//! `sqlx::Error` is classified here into a [`DbError`]; the engine then
//! turns `NotFound` into `NOT_FOUND` and everything else into
//! `PERSISTENCE_ERROR`.
//!
//! ```text
//! sqlx::Error ──► DbError ──► ApiError { code, message }
//! ```

use thiserror::Error;

/// Ledger store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row in the caller's tenant/branch has this id.
    ///
    /// ## When This Occurs
    /// - Document id doesn't exist, or belongs to another tenant/branch
    /// - Stock update matched no product row
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the row.
    ///
    /// ## When This Occurs
    /// - Purchase or sale number collision
    /// - Duplicate SKU within a branch
    #[error("Duplicate value for {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign key constraint rejected the row.
    ///
    /// ## When This Occurs
    /// - Purchase order naming a non-existent supplier
    /// - Refund naming a non-existent sale
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint rejected the row.
    #[error("Constraint violation: {0}")]
    CheckViolation(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other runtime SQL error.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A transaction could not begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Wraps a failure to begin or commit a transaction.
    pub fn transaction(err: sqlx::Error) -> Self {
        DbError::TransactionFailed(err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → by SQLite constraint message
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => classify_database_message(db_err.message()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

// SQLite reports constraint failures only through the message text:
//   "UNIQUE constraint failed: <table>.<column>[, ...]"
//   "FOREIGN KEY constraint failed"
//   "CHECK constraint failed: <expr>"
fn classify_database_message(msg: &str) -> DbError {
    if let Some(constraint) = msg.strip_prefix("UNIQUE constraint failed: ") {
        DbError::UniqueViolation {
            constraint: constraint.to_string(),
        }
    } else if msg.contains("FOREIGN KEY constraint failed") {
        DbError::ForeignKeyViolation {
            message: msg.to_string(),
        }
    } else if msg.contains("CHECK constraint failed") {
        DbError::CheckViolation(msg.to_string())
    } else {
        DbError::QueryFailed(msg.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
