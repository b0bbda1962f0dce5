//! # Config Commands
//!
//! Settings dialog actions: raw key access, connection details, language.
//!
//! ## Connection Settings Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Settings dialog                                                        │
//! │       │                                                                 │
//! │       ├── test_connection(form)   check MySQL only, nothing saved       │
//! │       │                                                                 │
//! │       ├── save_connection(form)   host/port/user/password/database      │
//! │       │                           → config.json (Base64 values)         │
//! │       │                                                                 │
//! │       └── reconnect()             reopen the store from config.json     │
//! │                                   (MySQL, else embedded SQLite)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use stockroom_core::{CoreError, Language, ValidationError};
use stockroom_db::descriptor::parse_port;
use stockroom_db::{ConnectionDescriptor, RecordStore};

use crate::error::{ApiError, AppError};
use crate::state::AppState;

/// Config key of the UI language.
pub const LANGUAGE_KEY: &str = "language";

/// Connection fields as typed into the settings dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionForm {
    pub host: String,
    /// Free text; blank or invalid means the default MySQL port.
    pub port: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionForm {
    pub fn to_descriptor(&self) -> ConnectionDescriptor {
        ConnectionDescriptor::new(
            self.host.trim(),
            parse_port(Some(&self.port)),
            self.user.trim(),
            self.password.as_str(),
            self.database.trim(),
        )
    }
}

impl From<ConnectionDescriptor> for ConnectionForm {
    fn from(descriptor: ConnectionDescriptor) -> Self {
        ConnectionForm {
            port: descriptor.port.to_string(),
            host: descriptor.host,
            user: descriptor.user,
            password: descriptor.password,
            database: descriptor.database,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    /// `networked` or `embedded`
    pub backend: String,
}

// =============================================================================
// Raw Keys
// =============================================================================

/// Decoded value of `key`, absent when never saved.
pub async fn config_get(state: &AppState, key: &str) -> Result<Option<String>, ApiError> {
    let key = require_key(key)?;
    Ok(state.config.load(key))
}

pub async fn config_set(state: &AppState, key: &str, value: &str) -> Result<(), ApiError> {
    let key = require_key(key)?;
    debug!(key, "config_set command");

    state.config.save(key, value).map_err(AppError::from)?;
    Ok(())
}

// =============================================================================
// Connection
// =============================================================================

/// Connection settings as saved, for pre-filling the dialog.
pub async fn load_connection(state: &AppState) -> Result<ConnectionForm, ApiError> {
    Ok(state.saved_descriptor().into())
}

/// Persists the dialog's connection settings in one config write.
pub async fn save_connection(state: &AppState, form: ConnectionForm) -> Result<(), ApiError> {
    let descriptor = form.to_descriptor();
    info!(?descriptor, "Saving connection settings");

    let pairs = descriptor.to_pairs();
    state
        .config
        .save_all(pairs.iter().map(|(key, value)| (*key, value.as_str())))
        .map_err(AppError::from)?;
    Ok(())
}

/// Checks the networked database. Uses the saved settings when `form` is
/// `None`.
pub async fn test_connection(
    state: &AppState,
    form: Option<ConnectionForm>,
) -> Result<bool, ApiError> {
    let descriptor = match form {
        Some(form) => form.to_descriptor(),
        None => state.saved_descriptor(),
    };

    let reachable = RecordStore::test_connection(&descriptor, &state.settings.db_config()).await;
    info!(host = %descriptor.host, reachable, "Connection tested");
    Ok(reachable)
}

/// Reopens the record store with the saved settings.
pub async fn reconnect(state: &AppState) -> Result<ConnectionStatus, ApiError> {
    let kind = state.reconnect().await?;
    Ok(ConnectionStatus {
        backend: kind.to_string(),
    })
}

// =============================================================================
// Language
// =============================================================================

/// Saved UI language, English when unset or unrecognised.
pub async fn get_language(state: &AppState) -> Result<Language, ApiError> {
    let language = match state.config.load(LANGUAGE_KEY) {
        Some(code) => code.parse::<Language>().unwrap_or_else(|e| {
            warn!(value = %code, error = %e, "Unknown language in config");
            Language::default()
        }),
        None => Language::default(),
    };
    Ok(language)
}

pub async fn set_language(state: &AppState, code: &str) -> Result<Language, ApiError> {
    let language = code.parse::<Language>().map_err(CoreError::from)?;

    state
        .config
        .save(LANGUAGE_KEY, language.code())
        .map_err(AppError::from)?;
    info!(%language, "Language changed");
    Ok(language)
}

fn require_key(key: &str) -> Result<&str, ApiError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(CoreError::from(ValidationError::Required {
            field: "key".to_string(),
        })
        .into());
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::{AppSettings, StorageMode};
    use stockroom_db::descriptor::DEFAULT_MYSQL_PORT;

    async fn state_in(dir: &tempfile::TempDir) -> AppState {
        AppState::bootstrap(AppSettings::with_data_dir(dir.path()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir).await;

        config_set(&state, "password", "p@ss,🔐").await.unwrap();

        assert_eq!(
            config_get(&state, "password").await.unwrap().as_deref(),
            Some("p@ss,🔐")
        );
        assert_eq!(config_get(&state, "host").await.unwrap(), None);
        assert_eq!(
            config_get(&state, " ").await.unwrap_err().code,
            ErrorCode::ValidationError
        );
    }

    #[tokio::test]
    async fn test_save_connection_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir).await;
        set_language(&state, "si").await.unwrap();

        save_connection(
            &state,
            ConnectionForm {
                host: " db.local ".into(),
                port: "not a port".into(),
                user: "stock".into(),
                password: "s3cret".into(),
                database: "inventory".into(),
            },
        )
        .await
        .unwrap();

        let saved = load_connection(&state).await.unwrap();
        assert_eq!(saved.host, "db.local");
        assert_eq!(saved.port, DEFAULT_MYSQL_PORT.to_string());
        assert_eq!(saved.password, "s3cret");
        assert_eq!(get_language(&state).await.unwrap(), Language::Slovenian);
    }

    #[tokio::test]
    async fn test_connection_to_closed_port() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir).await;
        let form = ConnectionForm {
            host: "127.0.0.1".into(),
            port: "1".into(),
            ..ConnectionForm::default()
        };

        assert!(!test_connection(&state, Some(form)).await.unwrap());
        assert!(!test_connection(&state, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_reconnect_reports_backend() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir).await;

        let status = reconnect(&state).await.unwrap();
        assert_eq!(status.backend, "embedded");

        let file_dir = tempfile::tempdir().unwrap();
        let file_state = AppState::bootstrap(
            AppSettings::with_data_dir(file_dir.path()).storage(StorageMode::FlatFile),
        )
        .await
        .unwrap();
        assert_eq!(
            reconnect(&file_state).await.unwrap_err().code,
            ErrorCode::Unavailable
        );
    }

    #[tokio::test]
    async fn test_language() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir).await;

        assert_eq!(get_language(&state).await.unwrap(), Language::English);

        assert_eq!(set_language(&state, "SI").await.unwrap(), Language::Slovenian);
        assert_eq!(
            config_get(&state, LANGUAGE_KEY).await.unwrap().as_deref(),
            Some("si")
        );

        let err = set_language(&state, "de").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_language(&state).await.unwrap(), Language::Slovenian);

        config_set(&state, LANGUAGE_KEY, "klingon").await.unwrap();
        assert_eq!(get_language(&state).await.unwrap(), Language::English);
    }
}
