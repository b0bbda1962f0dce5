//! # Record Store
//!
//! Connection management for the two backends.
//!
//! ## Connect Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RecordStore::connect                               │
//! │                                                                         │
//! │  ConnectionDescriptor (host, port, user, password, database)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  host set? ── no ──────────────────────┐                               │
//! │       │ yes                            │                               │
//! │       ▼                                │                               │
//! │  MySQL within connect_timeout? ── no ──┤  warn! with the reason        │
//! │       │ yes                            │                               │
//! │       ▼                                │                               │
//! │  ensure_schema ok? ── no (closed) ─────┤                               │
//! │       │ yes                            ▼                               │
//! │       │                         SQLite at fallback_path                │
//! │       │                         (dirs + file created)                  │
//! │       │                         + ensure_schema                        │
//! │       │                                │                               │
//! │       │                                ├── fails → ConnectionFailed    │
//! │       ▼                                ▼                               │
//! │  RecordStore ready: items() / logs()                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Connection Loss
//! A call failing with [`DbError::ConnectionLost`] marks the store stale.
//! The next call reopens a backend with the same descriptor (MySQL first,
//! then SQLite) before running. The failed call itself is not retried.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::mysql::MySqlRow;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::backend::{Backend, BackendKind, Dialect, ExecOutcome, Statement};
use crate::descriptor::ConnectionDescriptor;
use crate::error::{DbError, DbResult};
use crate::repository::item::ItemRepository;
use crate::repository::log::LogRepository;

/// Default location of the embedded database, relative to the working dir.
pub const DEFAULT_FALLBACK_PATH: &str = "data/inventory.db";

// =============================================================================
// Configuration
// =============================================================================

/// Record store configuration.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use stockroom_db::DbConfig;
///
/// let config = DbConfig::new("data/inventory.db")
///     .connect_timeout(Duration::from_secs(3))
///     .max_connections(2);
///
/// assert_eq!(config.max_connections, 2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file used when the networked backend is unreachable.
    pub fallback_path: PathBuf,

    /// Maximum connections per pool.
    /// Default: 5
    pub max_connections: u32,

    /// Connections kept open in the embedded pool.
    /// Default: 1
    pub min_connections: u32,

    /// Bound on one networked connect attempt, and on pool acquires.
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a pooled connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to create missing tables on connect.
    /// Default: true
    pub ensure_schema: bool,
}

impl DbConfig {
    pub fn new(fallback_path: impl Into<PathBuf>) -> Self {
        DbConfig {
            fallback_path: fallback_path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            ensure_schema: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn ensure_schema(mut self, ensure: bool) -> Self {
        self.ensure_schema = ensure;
        self
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::new(DEFAULT_FALLBACK_PATH)
    }
}

// =============================================================================
// Record Store
// =============================================================================

/// Handle to whichever backend is active.
///
/// Cloning shares the same underlying connection; a reconnect through one
/// clone is seen by all of them.
///
/// ## Usage
/// ```rust,ignore
/// let store = RecordStore::connect(descriptor, DbConfig::default()).await?;
/// let items = store.items().list().await?;
/// store.logs().append("alice", "Added Drill (code 004) with quantity 12").await?;
/// ```
///
/// SQL is only issued by the repositories; the raw statement API is not
/// reachable from other crates:
/// ```compile_fail
/// # async fn purge(store: stockroom_db::RecordStore) {
/// let _ = store
///     .execute_raw(|_| stockroom_db::Statement::new("DELETE FROM inventory"))
///     .await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RecordStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: DbConfig,
    descriptor: RwLock<ConnectionDescriptor>,
    backend: RwLock<Backend>,
    stale: AtomicBool,
}

impl RecordStore {
    /// Connects to the networked backend, falling back to the embedded one.
    ///
    /// ## Errors
    /// [`DbError::ConnectionFailed`] when neither backend opens with its
    /// tables in place.
    pub async fn connect(descriptor: ConnectionDescriptor, config: DbConfig) -> DbResult<Self> {
        let backend = open_backend(&descriptor, &config).await?;

        Ok(RecordStore {
            inner: Arc::new(Inner {
                config,
                descriptor: RwLock::new(descriptor),
                backend: RwLock::new(backend),
                stale: AtomicBool::new(false),
            }),
        })
    }

    /// Checks whether the networked backend described by `descriptor` is
    /// reachable. Never falls back and never touches the active store.
    pub async fn test_connection(descriptor: &ConnectionDescriptor, config: &DbConfig) -> bool {
        match Backend::connect_networked(descriptor, config).await {
            Ok(backend) => {
                let ok = backend.ping().await;
                backend.close().await;
                debug!(host = %descriptor.host, ok, "Connection test finished");
                ok
            }
            Err(err) => {
                debug!(host = %descriptor.host, error = %err, "Connection test failed");
                false
            }
        }
    }

    /// Reconnects with a new descriptor (after the user saved new settings).
    ///
    /// On failure the previous backend stays active.
    pub async fn reconnect_with(&self, descriptor: ConnectionDescriptor) -> DbResult<BackendKind> {
        let backend = open_backend(&descriptor, &self.inner.config).await?;
        let kind = backend.kind();

        let previous = {
            let mut guard = self.inner.backend.write().await;
            std::mem::replace(&mut *guard, backend)
        };
        *self.inner.descriptor.write().await = descriptor;
        self.inner.stale.store(false, Ordering::Release);

        previous.close().await;
        info!(backend = %kind, "Record store reconnected");
        Ok(kind)
    }

    /// Creates the tables on the active backend if missing.
    pub async fn ensure_schema(&self) -> DbResult<()> {
        let backend = self.active_backend().await?;
        backend.ensure_schema().await
    }

    pub async fn backend_kind(&self) -> BackendKind {
        self.inner.backend.read().await.kind()
    }

    /// Descriptor the store was last (re)connected with.
    pub async fn descriptor(&self) -> ConnectionDescriptor {
        self.inner.descriptor.read().await.clone()
    }

    pub fn items(&self) -> ItemRepository {
        ItemRepository::new(self.clone())
    }

    pub fn logs(&self) -> LogRepository {
        LogRepository::new(self.clone())
    }

    /// Runs a write statement built for the active dialect.
    ///
    /// ## Returns
    /// Affected-row count and generated id, after commit.
    pub(crate) async fn execute_raw<F>(&self, build: F) -> DbResult<ExecOutcome>
    where
        F: FnOnce(Dialect) -> Statement,
    {
        let backend = self.active_backend().await?;
        let statement = build(backend.dialect());
        let result = backend.execute(&statement).await;
        self.observe(result)
    }

    /// Runs a read statement built for the active dialect.
    pub(crate) async fn fetch_all<T, F>(&self, build: F) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
        F: FnOnce(Dialect) -> Statement,
    {
        let backend = self.active_backend().await?;
        let statement = build(backend.dialect());
        let result = backend.fetch_all(&statement).await;
        self.observe(result)
    }

    /// Like [`fetch_all`](Self::fetch_all), for at most one row.
    pub(crate) async fn fetch_optional<T, F>(&self, build: F) -> DbResult<Option<T>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
        F: FnOnce(Dialect) -> Statement,
    {
        let backend = self.active_backend().await?;
        let statement = build(backend.dialect());
        let result = backend.fetch_optional(&statement).await;
        self.observe(result)
    }

    /// Checks if the active backend answers queries.
    pub async fn health_check(&self) -> bool {
        self.inner.backend.read().await.ping().await
    }

    pub async fn close(&self) {
        info!("Closing record store");
        self.inner.backend.read().await.close().await;
    }

    /// Returns the backend to run on, reopening it first if the last call
    /// lost the connection.
    async fn active_backend(&self) -> DbResult<Backend> {
        if self.inner.stale.load(Ordering::Acquire) {
            let descriptor = self.inner.descriptor.read().await.clone();
            warn!("Previous call lost the connection, reconnecting");

            let backend = open_backend(&descriptor, &self.inner.config).await?;
            *self.inner.backend.write().await = backend.clone();
            self.inner.stale.store(false, Ordering::Release);
            return Ok(backend);
        }

        Ok(self.inner.backend.read().await.clone())
    }

    fn observe<T>(&self, result: DbResult<T>) -> DbResult<T> {
        if let Err(err) = &result {
            if err.is_connection_loss() {
                warn!(error = %err, "Connection lost, will reconnect on next call");
                self.inner.stale.store(true, Ordering::Release);
            }
        }
        result
    }
}

/// MySQL first, SQLite second. Each attempt includes creating the schema.
async fn open_backend(descriptor: &ConnectionDescriptor, config: &DbConfig) -> DbResult<Backend> {
    let networked = Backend::connect_networked(descriptor, config).await;
    if networked.is_ok() {
        info!(host = %descriptor.host, database = %descriptor.database, "Connected to networked backend");
    }
    open_with_fallback(networked, config).await
}

/// Keeps `primary` if its schema is ready, otherwise opens the embedded
/// file at `config.fallback_path`.
async fn open_with_fallback(primary: DbResult<Backend>, config: &DbConfig) -> DbResult<Backend> {
    let primary = match prepare(primary, config).await {
        Ok(backend) => return Ok(backend),
        Err(e) => unavailable_reason(e),
    };
    warn!(
        reason = %primary,
        path = %config.fallback_path.display(),
        "Networked backend unavailable, using embedded database"
    );

    match prepare(Backend::connect_embedded(config).await, config).await {
        Ok(backend) => {
            info!(path = %config.fallback_path.display(), "Opened embedded backend");
            Ok(backend)
        }
        Err(e) => {
            let fallback = unavailable_reason(e);
            error!(%primary, %fallback, "No backend available");
            Err(DbError::ConnectionFailed { primary, fallback })
        }
    }
}

/// Ensures the schema on a freshly opened backend. A backend whose schema
/// fails is closed before the error is returned.
async fn prepare(opened: DbResult<Backend>, config: &DbConfig) -> DbResult<Backend> {
    let backend = opened?;
    if config.ensure_schema {
        if let Err(e) = backend.ensure_schema().await {
            backend.close().await;
            return Err(e);
        }
        debug!(backend = %backend.kind(), "Schema ensured");
    }
    Ok(backend)
}

fn unavailable_reason(err: DbError) -> String {
    match err {
        DbError::BackendUnavailable { reason, .. } => reason,
        other => other.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_descriptor() -> ConnectionDescriptor {
        // Port 1 on loopback refuses immediately
        ConnectionDescriptor::new("127.0.0.1", 1, "root", "", "inventory")
    }

    fn test_config(dir: &tempfile::TempDir) -> DbConfig {
        DbConfig::new(dir.path().join("data").join("inventory.db"))
            .connect_timeout(Duration::from_secs(2))
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .ensure_schema(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.ensure_schema);
        assert_eq!(DbConfig::default().fallback_path, PathBuf::from(DEFAULT_FALLBACK_PATH));
    }

    #[tokio::test]
    async fn test_unconfigured_host_uses_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let path = config.fallback_path.clone();

        let store = RecordStore::connect(ConnectionDescriptor::default(), config)
            .await
            .unwrap();

        assert_eq!(store.backend_kind().await, BackendKind::Embedded);
        assert!(path.exists());
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn test_unreachable_server_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::connect(unreachable_descriptor(), test_config(&dir))
            .await
            .unwrap();

        assert_eq!(store.backend_kind().await, BackendKind::Embedded);
        assert!(store.items().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_both_backends_failing() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let config = DbConfig::new(blocker.join("inventory.db"))
            .connect_timeout(Duration::from_secs(2));

        let err = RecordStore::connect(unreachable_descriptor(), config)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ConnectionFailed { .. }));
    }

    #[tokio::test]
    async fn test_schema_failure_on_primary_falls_back() {
        let dir = tempfile::tempdir().unwrap();

        // An index already named `inventory` makes the table DDL fail
        let broken = Backend::connect_embedded(&DbConfig::new(dir.path().join("broken.db")))
            .await
            .unwrap();
        broken
            .execute(&Statement::new("CREATE TABLE other (x INTEGER)"))
            .await
            .unwrap();
        broken
            .execute(&Statement::new("CREATE INDEX inventory ON other (x)"))
            .await
            .unwrap();
        assert!(matches!(broken.ensure_schema().await, Err(DbError::SchemaFailed(_))));

        let config = test_config(&dir);
        let backend = open_with_fallback(Ok(broken.clone()), &config).await.unwrap();

        assert!(config.fallback_path.exists());
        assert!(!broken.ping().await);
        assert!(backend.ping().await);
        backend.ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_schema_failure_on_both_backends() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let fallback = Backend::connect_embedded(&config).await.unwrap();
        fallback
            .execute(&Statement::new("CREATE TABLE other (x INTEGER)"))
            .await
            .unwrap();
        fallback
            .execute(&Statement::new("CREATE INDEX inventory ON other (x)"))
            .await
            .unwrap();
        fallback.close().await;

        let primary = Err(DbError::BackendUnavailable {
            backend: BackendKind::Networked,
            reason: "refused".to_string(),
        });
        let err = open_with_fallback(primary, &config).await.unwrap_err();

        assert!(
            matches!(err, DbError::ConnectionFailed { ref primary, ref fallback } if primary == "refused" && fallback.contains("inventory"))
        );
    }

    #[tokio::test]
    async fn test_connection_test_reports_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        assert!(!RecordStore::test_connection(&unreachable_descriptor(), &config).await);
        assert!(!RecordStore::test_connection(&ConnectionDescriptor::default(), &config).await);
        // Testing never creates the fallback file
        assert!(!config.fallback_path.exists());
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::connect(ConnectionDescriptor::default(), test_config(&dir))
            .await
            .unwrap();

        store.items().add("Drill", "004", 12).await.unwrap();
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();

        assert_eq!(store.items().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reconnects_after_connection_loss() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::connect(ConnectionDescriptor::default(), test_config(&dir))
            .await
            .unwrap();
        store.items().add("Drill", "004", 12).await.unwrap();

        // Simulate the connection going away underneath the store
        store.inner.backend.read().await.close().await;

        let err = store.items().list().await.unwrap_err();
        assert!(err.is_connection_loss());

        let items = store.items().list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].code, "004");
    }

    #[tokio::test]
    async fn test_reconnect_with_new_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::connect(ConnectionDescriptor::default(), test_config(&dir))
            .await
            .unwrap();

        let kind = store.reconnect_with(unreachable_descriptor()).await.unwrap();

        assert_eq!(kind, BackendKind::Embedded);
        assert_eq!(store.descriptor().await.port, 1);
        assert!(store.health_check().await);
    }
}
