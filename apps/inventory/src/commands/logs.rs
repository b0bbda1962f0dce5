//! # Log Commands
//!
//! The activity log view: list, filter, and free-form notes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use stockroom_core::{CoreError, LogEntry, ValidationError};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryDto {
    /// Absent for entries from the local log file.
    pub actor: Option<String>,

    /// `HH:MM:SS DD-MM-YYYY`
    pub timestamp: String,

    pub message: String,
}

impl From<LogEntry> for LogEntryDto {
    fn from(entry: LogEntry) -> Self {
        let timestamp = entry.formatted_timestamp();
        LogEntryDto {
            actor: entry.actor,
            timestamp,
            message: entry.message,
        }
    }
}

/// Appends a message that is not tied to an item change.
pub async fn append_log(state: &AppState, message: &str) -> Result<(), ApiError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(CoreError::from(ValidationError::Required {
            field: "message".to_string(),
        })
        .into());
    }

    state.activity.read().await.record(message).await?;
    Ok(())
}

/// Every entry, oldest first.
pub async fn list_logs(state: &AppState) -> Result<Vec<LogEntryDto>, ApiError> {
    let entries = state.activity.read().await.entries().await?;
    debug!(count = entries.len(), "list_logs command");

    Ok(entries.into_iter().map(LogEntryDto::from).collect())
}

/// Entries whose timestamp or message contains `term`, ignoring case.
pub async fn filter_logs(state: &AppState, term: &str) -> Result<Vec<LogEntryDto>, ApiError> {
    debug!(term, "filter_logs command");

    let entries = state.activity.read().await.entries().await?;
    Ok(entries
        .into_iter()
        .filter(|entry| entry.matches(term))
        .map(LogEntryDto::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::AppSettings;

    #[tokio::test]
    async fn test_append_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::bootstrap(AppSettings::with_data_dir(dir.path()))
            .await
            .unwrap();

        append_log(&state, "Stocktake started").await.unwrap();
        append_log(&state, "  Stocktake finished  ").await.unwrap();
        append_log(&state, "Shelf B relabelled").await.unwrap();

        let all = list_logs(&state).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].message, "Stocktake finished");
        assert_eq!(all[0].actor.as_deref(), Some("Server"));

        let hits = filter_logs(&state, "STOCKTAKE").await.unwrap();
        assert_eq!(hits.len(), 2);

        let year = all[0].timestamp[all[0].timestamp.len() - 4..].to_string();
        assert_eq!(filter_logs(&state, &year).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::bootstrap(AppSettings::with_data_dir(dir.path()))
            .await
            .unwrap();

        let err = append_log(&state, "   ").await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list_logs(&state).await.unwrap().is_empty());
    }
}
