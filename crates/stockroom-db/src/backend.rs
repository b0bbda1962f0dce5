//! # Backends
//!
//! The two interchangeable SQL engines behind the record store.
//!
//! ## Dialect Differences
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Networked (MySQL)     Embedded (SQLite)               │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │  Placeholders      ?  ?  ?               ?1 ?2 ?3                       │
//! │  Auto-increment    AUTO_INCREMENT        AUTOINCREMENT                  │
//! │  Location          host:port/database    data/inventory.db              │
//! │  Insert id         last_insert_id()      last_insert_rowid()            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every difference is resolved here. Repositories build a [`Statement`]
//! against a [`Dialect`] and never branch on the backend themselves.
//!
//! ## Write Path
//! ```text
//! execute(statement)
//!     │
//!     ├── BEGIN
//!     ├── run statement ──── error ──► ROLLBACK ──► Err(DbError)
//!     └── COMMIT ──────────────────────────────────► Ok(ExecOutcome)
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlPoolOptions, MySqlRow};
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{FromRow, MySqlPool, SqlitePool};
use tracing::{debug, warn};

use crate::descriptor::ConnectionDescriptor;
use crate::error::{DbError, DbResult};
use crate::schema;
use crate::store::DbConfig;

// =============================================================================
// Backend Kind & Dialect
// =============================================================================

/// Which engine a store is currently talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// MySQL server described by the connection config.
    Networked,

    /// Local SQLite file.
    Embedded,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Networked => write!(f, "networked"),
            BackendKind::Embedded => write!(f, "embedded"),
        }
    }
}

/// Placeholder syntax of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `?` for every parameter, bound in order (MySQL).
    Positional,

    /// `?1`, `?2`, ... (SQLite).
    Numbered,
}

impl Dialect {
    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Positional => "?".to_string(),
            Dialect::Numbered => format!("?{}", index),
        }
    }

    /// `count` comma-separated placeholders starting at 1.
    pub fn placeholders(self, count: usize) -> String {
        (1..=count)
            .map(|i| self.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `col = ?` pairs for an UPDATE, numbered from 1.
    pub fn assignments(self, columns: &[&str]) -> String {
        columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = {}", col, self.placeholder(i + 1)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// Statements
// =============================================================================

/// A bound parameter value. The schema only has text and integer columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Text(String),
    Int(i64),
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Param::Int(i64::from(value))
    }
}

/// SQL text rendered for one dialect plus its parameters, in bind order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<Param>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Statement {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Appends the next parameter.
    pub fn bind(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

/// Result of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,

    /// Primary key generated by an INSERT, when the backend reports one.
    pub last_insert_id: Option<i64>,
}

/// Binds every parameter of a [`Statement`] onto a sqlx query.
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for param in $params {
            query = match param {
                Param::Text(value) => query.bind(value.clone()),
                Param::Int(value) => query.bind(*value),
            };
        }
        query
    }};
}

/// Runs one statement inside its own transaction, rolling back on failure.
macro_rules! execute_in_transaction {
    ($pool:expr, $db:ty, $statement:expr) => {{
        let mut tx = $pool.begin().await?;
        let query = bind_params!(sqlx::query::<$db>($statement.sql()), $statement.params());

        match query.execute(&mut *tx).await {
            Ok(result) => {
                tx.commit().await?;
                Ok(result)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(DbError::from(err))
            }
        }
    }};
}

// =============================================================================
// Backend
// =============================================================================

/// An open connection pool to one of the two engines.
///
/// Cloning is cheap (pools are reference counted).
#[derive(Debug, Clone)]
pub enum Backend {
    Networked(MySqlPool),
    Embedded(SqlitePool),
}

impl Backend {
    /// Opens a MySQL pool for `descriptor`.
    ///
    /// The whole attempt is bounded by `config.connect_timeout`. An empty
    /// host is rejected without touching the network.
    pub async fn connect_networked(
        descriptor: &ConnectionDescriptor,
        config: &DbConfig,
    ) -> DbResult<Self> {
        let unavailable = |reason: String| DbError::BackendUnavailable {
            backend: BackendKind::Networked,
            reason,
        };

        if !descriptor.is_configured() {
            return Err(unavailable("no host configured".to_string()));
        }

        debug!(
            host = %descriptor.host,
            port = descriptor.port,
            database = %descriptor.database,
            "Connecting to networked backend"
        );

        let mut options = MySqlConnectOptions::new()
            .host(&descriptor.host)
            .port(descriptor.port)
            .username(&descriptor.user);
        if !descriptor.password.is_empty() {
            options = options.password(&descriptor.password);
        }
        if !descriptor.database.is_empty() {
            options = options.database(&descriptor.database);
        }

        let connect = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(0)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options);

        match tokio::time::timeout(config.connect_timeout, connect).await {
            Ok(Ok(pool)) => Ok(Backend::Networked(pool)),
            Ok(Err(err)) => Err(unavailable(err.to_string())),
            Err(_) => Err(unavailable(format!(
                "timed out after {}s",
                config.connect_timeout.as_secs()
            ))),
        }
    }

    /// Opens (creating if needed) the SQLite file at `config.fallback_path`.
    pub async fn connect_embedded(config: &DbConfig) -> DbResult<Self> {
        let path = config.fallback_path.as_path();
        let unavailable = |reason: String| DbError::BackendUnavailable {
            backend: BackendKind::Embedded,
            reason,
        };

        create_parent_dir(path).map_err(|e| unavailable(e.to_string()))?;

        debug!(path = %path.display(), "Opening embedded backend");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            // Readers never see a half-written transaction
            .journal_mode(SqliteJournalMode::Wal)
            // A committed log row survives power loss
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(Backend::Embedded(pool))
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Networked(_) => BackendKind::Networked,
            Backend::Embedded(_) => BackendKind::Embedded,
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Backend::Networked(_) => Dialect::Positional,
            Backend::Embedded(_) => Dialect::Numbered,
        }
    }

    /// Creates `inventory` and `logs` if they do not exist. Idempotent.
    pub async fn ensure_schema(&self) -> DbResult<()> {
        for ddl in schema::create_statements(self.kind()) {
            let result = match self {
                Backend::Networked(pool) => sqlx::query(ddl).execute(pool).await.map(|_| ()),
                Backend::Embedded(pool) => sqlx::query(ddl).execute(pool).await.map(|_| ()),
            };
            result.map_err(|e| DbError::SchemaFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Runs a write statement in its own transaction.
    pub async fn execute(&self, statement: &Statement) -> DbResult<ExecOutcome> {
        match self {
            Backend::Networked(pool) => {
                let result = execute_in_transaction!(pool, MySql, statement)?;
                let insert_id = result.last_insert_id();
                Ok(ExecOutcome {
                    rows_affected: result.rows_affected(),
                    last_insert_id: (insert_id > 0).then_some(insert_id as i64),
                })
            }
            Backend::Embedded(pool) => {
                let result = execute_in_transaction!(pool, Sqlite, statement)?;
                let insert_id = result.last_insert_rowid();
                Ok(ExecOutcome {
                    rows_affected: result.rows_affected(),
                    last_insert_id: (insert_id > 0).then_some(insert_id),
                })
            }
        }
    }

    /// Runs a read statement and maps every row.
    pub async fn fetch_all<T>(&self, statement: &Statement) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let rows = match self {
            Backend::Networked(pool) => {
                bind_params!(sqlx::query_as::<MySql, T>(statement.sql()), statement.params())
                    .fetch_all(pool)
                    .await?
            }
            Backend::Embedded(pool) => {
                bind_params!(sqlx::query_as::<Sqlite, T>(statement.sql()), statement.params())
                    .fetch_all(pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Runs a read statement expected to return at most one row.
    pub async fn fetch_optional<T>(&self, statement: &Statement) -> DbResult<Option<T>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let row = match self {
            Backend::Networked(pool) => {
                bind_params!(sqlx::query_as::<MySql, T>(statement.sql()), statement.params())
                    .fetch_optional(pool)
                    .await?
            }
            Backend::Embedded(pool) => {
                bind_params!(sqlx::query_as::<Sqlite, T>(statement.sql()), statement.params())
                    .fetch_optional(pool)
                    .await?
            }
        };
        Ok(row)
    }

    /// Checks the backend can answer a trivial query.
    pub async fn ping(&self) -> bool {
        match self {
            Backend::Networked(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            Backend::Embedded(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
        }
    }

    pub async fn close(&self) {
        match self {
            Backend::Networked(pool) => pool.close().await,
            Backend::Embedded(pool) => pool.close().await,
        }
    }
}

fn create_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_per_dialect() {
        assert_eq!(Dialect::Positional.placeholders(3), "?, ?, ?");
        assert_eq!(Dialect::Numbered.placeholders(3), "?1, ?2, ?3");
        assert_eq!(
            Dialect::Numbered.assignments(&["name", "qty"]),
            "name = ?1, qty = ?2"
        );
        assert_eq!(
            Dialect::Positional.assignments(&["name", "qty"]),
            "name = ?, qty = ?"
        );
    }

    #[test]
    fn test_statement_keeps_bind_order() {
        let stmt = Statement::new("UPDATE inventory SET qty = ?1 WHERE id = ?2")
            .bind(15u32)
            .bind("004");

        assert_eq!(stmt.params(), &[Param::Int(15), Param::Text("004".into())]);
    }

    #[tokio::test]
    async fn test_embedded_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("inventory.db");

        let backend = Backend::connect_embedded(&DbConfig::new(&path)).await.unwrap();

        assert_eq!(backend.kind(), BackendKind::Embedded);
        assert_eq!(backend.dialect(), Dialect::Numbered);
        assert!(path.exists());
        assert!(backend.ping().await);
    }

    #[tokio::test]
    async fn test_networked_requires_host() {
        let config = DbConfig::new("unused.db");
        let err = Backend::connect_networked(&ConnectionDescriptor::default(), &config)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::BackendUnavailable {
                backend: BackendKind::Networked,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::connect_embedded(&DbConfig::new(dir.path().join("t.db")))
            .await
            .unwrap();
        backend.ensure_schema().await.unwrap();

        let insert = |code: &str| {
            Statement::new("INSERT INTO inventory (name, code, qty) VALUES (?1, ?2, ?3)")
                .bind("Drill")
                .bind(code)
                .bind(1u32)
        };

        let outcome = backend.execute(&insert("004")).await.unwrap();
        assert_eq!(outcome.rows_affected, 1);
        assert!(outcome.last_insert_id.is_some());

        let err = backend.execute(&insert("004")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(_)));

        let count: Option<(i64,)> = backend
            .fetch_optional(&Statement::new("SELECT COUNT(*) FROM inventory"))
            .await
            .unwrap();
        assert_eq!(count, Some((1,)));
    }
}
