//! # Error Types
//!
//! [`AppError`] collects every crate's errors inside the app; [`ApiError`] is
//! what leaves a command.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  UI                           Rust core                                 │
//! │  ──                           ─────────                                 │
//! │                                                                         │
//! │  scan_item("004", 3)                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  CoreError / DbError / MirrorError ... ──► AppError              │  │
//! │  │                                               │                  │  │
//! │  │                      raw detail logged ◄──────┤                  │  │
//! │  │                                               ▼                  │  │
//! │  │                          ApiError { code, message } ────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "NOT_FOUND", "message": "Product code '9' not found!" }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;
use stockroom_files::{ConfigError, LocalLogError, MirrorError};

// =============================================================================
// AppError
// =============================================================================

/// Any failure inside the app crate.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error(transparent)]
    LocalLog(#[from] LocalLogError),

    /// The flat file could not be read at startup; editing would overwrite it.
    #[error("Inventory file {0} is unreadable")]
    MirrorUnreadable(PathBuf),

    /// A database-only operation in flat-file mode.
    #[error("Database storage is not in use")]
    DatabaseDisabled,

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Core(CoreError::Validation(err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// ApiError
// =============================================================================

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "DUPLICATE_CODE",
///   "message": "Product code '004' already exists"
/// }
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Feedback text for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Item not found by code
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Product code already used
    DuplicateCode,

    /// Quantity would exceed the storable maximum
    QuantityOverflow,

    /// Record store operation failed
    DatabaseError,

    /// No backend could be reached
    ConnectionFailed,

    /// Config, mirror or log file failed
    StorageError,

    /// Operation not available in the current storage mode
    Unavailable,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("Product code '{}' not found!", code),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(code) => ApiError::not_found(&code),
            CoreError::DuplicateCode(code) => ApiError::new(
                ErrorCode::DuplicateCode,
                format!("Product code '{}' already exists", code),
            ),
            overflow @ CoreError::QuantityOverflow { .. } => {
                ApiError::new(ErrorCode::QuantityOverflow, overflow.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateCode { code } => ApiError::new(
                ErrorCode::DuplicateCode,
                format!("Product code '{}' already exists", code),
            ),
            DbError::NotFound { entity, id } => {
                tracing::warn!(%entity, %id, "Row vanished before the write");
                ApiError::new(ErrorCode::NotFound, "The item no longer exists")
            }
            DbError::ConnectionFailed { primary, fallback } => {
                tracing::error!(%primary, %fallback, "No database backend available");
                ApiError::new(ErrorCode::ConnectionFailed, "Could not connect to any database")
            }
            DbError::ConnectionLost(e) => {
                tracing::error!("Database connection lost: {}", e);
                ApiError::new(
                    ErrorCode::DatabaseError,
                    "Database connection lost, please try again",
                )
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Core(e) => e.into(),
            AppError::Db(e) => e.into(),
            AppError::Config(e) => {
                tracing::error!("Config save failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Could not save settings")
            }
            AppError::Mirror(e) => {
                tracing::error!("Inventory file failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Could not access the inventory file")
            }
            AppError::LocalLog(e) => {
                tracing::error!("Log file failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Could not write the activity log")
            }
            AppError::MirrorUnreadable(path) => ApiError::new(
                ErrorCode::StorageError,
                format!(
                    "Inventory file {} is unreadable; fix or remove it before editing",
                    path.display()
                ),
            ),
            AppError::DatabaseDisabled => ApiError::new(
                ErrorCode::Unavailable,
                "Database storage is not in use",
            ),
            AppError::InvalidSetting(message) => ApiError::validation(message),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
