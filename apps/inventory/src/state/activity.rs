//! # Activity Log
//!
//! Who did what, appended after every successful change.
//!
//! ```text
//! ┌──────────────┐   record(msg)   ┌──────────────────────────────────────┐
//! │ ActivityLog  │ ───────────────►│ Database: logs table (actor, server  │
//! │              │                 │           clock)                     │
//! │ actor from   │                 │ File:     inventory.log (no actor)   │
//! │ config "user"│                 │ Memory:   degraded mode, lost on exit│
//! └──────────────┘                 └──────────────────────────────────────┘
//! ```
//!
//! One append per message, no buffering.

use std::sync::Mutex;

use chrono::{Local, Timelike};
use tracing::debug;

use stockroom_core::{LogEntry, DEFAULT_ACTOR};
use stockroom_db::RecordStore;
use stockroom_files::{ConfigStore, LocalLogFile};

use crate::error::{AppError, AppResult};

/// Config key naming the person at the keyboard.
pub const USER_KEY: &str = "user";

#[derive(Debug)]
pub enum LogSink {
    Database(RecordStore),
    File(LocalLogFile),
    Memory(Mutex<Vec<LogEntry>>),
}

#[derive(Debug)]
pub struct ActivityLog {
    sink: LogSink,
    config: ConfigStore,
}

impl ActivityLog {
    pub fn new(sink: LogSink, config: ConfigStore) -> Self {
        ActivityLog { sink, config }
    }

    pub fn database(store: RecordStore, config: ConfigStore) -> Self {
        Self::new(LogSink::Database(store), config)
    }

    pub fn file(log: LocalLogFile, config: ConfigStore) -> Self {
        Self::new(LogSink::File(log), config)
    }

    pub fn memory(config: ConfigStore) -> Self {
        Self::new(LogSink::Memory(Mutex::new(Vec::new())), config)
    }

    pub fn sink_name(&self) -> &'static str {
        match self.sink {
            LogSink::Database(_) => "database",
            LogSink::File(_) => "file",
            LogSink::Memory(_) => "memory",
        }
    }

    /// Configured user, or [`DEFAULT_ACTOR`] when unset or blank.
    pub fn actor(&self) -> String {
        self.config
            .load(USER_KEY)
            .map(|user| user.trim().to_string())
            .filter(|user| !user.is_empty())
            .unwrap_or_else(|| DEFAULT_ACTOR.to_string())
    }

    /// Appends `message` to the active sink.
    pub async fn record(&self, message: &str) -> AppResult<()> {
        let actor = self.actor();
        debug!(sink = self.sink_name(), %actor, message, "Recording activity");

        match &self.sink {
            LogSink::Database(store) => store.logs().append(&actor, message).await?,
            LogSink::File(log) => {
                log.append(message)?;
            }
            LogSink::Memory(entries) => {
                let now = Local::now().naive_local();
                let entry = LogEntry {
                    actor: Some(actor),
                    timestamp: now.with_nanosecond(0).unwrap_or(now),
                    message: message.to_string(),
                };
                lock(entries)?.push(entry);
            }
        }

        Ok(())
    }

    /// Every entry, oldest first.
    pub async fn entries(&self) -> AppResult<Vec<LogEntry>> {
        match &self.sink {
            LogSink::Database(store) => Ok(store.logs().list().await?),
            LogSink::File(log) => Ok(log.read()?),
            LogSink::Memory(entries) => Ok(lock(entries)?.clone()),
        }
    }
}

fn lock(entries: &Mutex<Vec<LogEntry>>) -> AppResult<std::sync::MutexGuard<'_, Vec<LogEntry>>> {
    entries
        .lock()
        .map_err(|_| AppError::Internal("activity log lock poisoned".to_string()))
}
