//! # Database Error Types
//!
//! Error types for record store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  MySQL / SQLite error (sqlx::Error)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── connection loss? → RecordStore marks backend stale           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError → ApiError (in app crate) ← feedback text for the UI         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::backend::BackendKind;

/// Record store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Update/delete by an id that no longer exists
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The product code is already used by another row.
    ///
    /// Raised from the backend's UNIQUE constraint, never pre-checked.
    #[error("Product code '{code}' already exists")]
    DuplicateCode { code: String },

    /// Unique constraint violation reported by the backend, before the
    /// repository attaches the offending code.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// One backend could not be opened.
    ///
    /// Only ever seen by the caller for the fallback backend; a primary
    /// failure is logged and swallowed.
    #[error("{backend} backend unavailable: {reason}")]
    BackendUnavailable { backend: BackendKind, reason: String },

    /// Neither backend could be opened.
    #[error("Connection failed (networked: {primary}; embedded: {fallback})")]
    ConnectionFailed { primary: String, fallback: String },

    /// The connection dropped mid-operation. The next call reconnects.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Creating the tables failed.
    #[error("Schema creation failed: {0}")]
    SchemaFailed(String),

    /// Query execution failed (the transaction was rolled back).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a DuplicateCode error.
    pub fn duplicate_code(code: impl Into<String>) -> Self {
        DbError::DuplicateCode { code: code.into() }
    }

    /// Attaches the offending code to a unique violation.
    ///
    /// `code` is the only UNIQUE column in the schema, so any unique
    /// violation from an inventory write is a duplicate code.
    pub fn for_code(self, code: &str) -> Self {
        match self {
            DbError::UniqueViolation(_) => DbError::duplicate_code(code),
            other => other,
        }
    }

    /// Returns true when the error means the backend handle is no longer
    /// usable and the store should reconnect before the next call.
    pub fn is_connection_loss(&self) -> bool {
        matches!(self, DbError::ConnectionLost(_))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound         → DbError::NotFound
/// sqlx::Error::Database (unique)   → DbError::UniqueViolation
/// sqlx::Error::Database (other)    → DbError::QueryFailed
/// Io / Tls / Protocol / Pool*      → DbError::ConnectionLost
/// Other                            → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            // MySQL: "Duplicate entry '004' for key 'code'" (1062)
            // SQLite: "UNIQUE constraint failed: inventory.code"
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    DbError::UniqueViolation(db_err.message().to_string())
                } else {
                    DbError::QueryFailed(db_err.message().to_string())
                }
            }

            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => DbError::ConnectionLost(err.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
