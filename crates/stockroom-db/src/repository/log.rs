//! # Log Repository
//!
//! The append-only `logs` table. Rows are never updated or deleted.
//! The backend stamps each row with its own clock on insert.

use chrono::NaiveDateTime;
use sqlx::FromRow;
use tracing::debug;

use stockroom_core::LogEntry;

use crate::backend::Statement;
use crate::error::DbResult;
use crate::store::RecordStore;

#[derive(Debug, FromRow)]
struct LogRow {
    user_id: String,
    timestamp: NaiveDateTime,
    message: String,
}

impl From<LogRow> for LogEntry {
    fn from(row: LogRow) -> Self {
        LogEntry {
            actor: Some(row.user_id),
            timestamp: row.timestamp,
            message: row.message,
        }
    }
}

/// Repository for audit log rows.
#[derive(Debug, Clone)]
pub struct LogRepository {
    store: RecordStore,
}

impl LogRepository {
    pub fn new(store: RecordStore) -> Self {
        LogRepository { store }
    }

    /// Appends one entry. The timestamp is assigned by the backend.
    pub async fn append(&self, actor: &str, message: &str) -> DbResult<()> {
        debug!(actor = %actor, "Appending log entry");

        self.store
            .execute_raw(|dialect| {
                Statement::new(format!(
                    "INSERT INTO logs (user_id, message) VALUES ({})",
                    dialect.placeholders(2)
                ))
                .bind(actor)
                .bind(message)
            })
            .await?;

        Ok(())
    }

    /// Every entry in insertion order.
    pub async fn list(&self) -> DbResult<Vec<LogEntry>> {
        let rows: Vec<LogRow> = self
            .store
            .fetch_all(|_| {
                Statement::new("SELECT user_id, timestamp, message FROM logs ORDER BY id")
            })
            .await?;

        Ok(rows.into_iter().map(LogEntry::from).collect())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: Option<(i64,)> = self
            .store
            .fetch_optional(|_| Statement::new("SELECT COUNT(*) FROM logs"))
            .await?;

        Ok(count.map(|(n,)| n).unwrap_or(0))
    }
}
