//! # State Module
//!
//! Everything the commands share, built once by [`AppState::bootstrap`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  AppSettings::from_env()                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  AppState::bootstrap(settings)                                          │
//! │         │                                                               │
//! │         ├── Database mode ──► RecordStore::connect ──┬─► ok             │
//! │         │                                            └─► failed:        │
//! │         │                                                Memory mode    │
//! │         └── FlatFile mode ──► inventory.csv + inventory.log             │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐      │
//! │  │ InventoryModel   │  │   ActivityLog    │  │   ConfigStore    │      │
//! │  │ tokio Mutex      │  │   tokio RwLock   │  │   plain file     │      │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  LOCK ORDER: inventory before activity.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod activity;
mod inventory;
mod settings;

pub use activity::{ActivityLog, LogSink, USER_KEY};
pub use inventory::{InventoryModel, ItemSource};
pub use settings::{AppSettings, StorageMode};

use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use stockroom_db::{BackendKind, ConnectionDescriptor, RecordStore};
use stockroom_files::{ConfigStore, FlatFileMirror, LocalLogFile};

use crate::error::{AppError, AppResult};

/// Shared state handed to every command.
#[derive(Debug)]
pub struct AppState {
    pub settings: AppSettings,
    pub config: ConfigStore,
    pub inventory: Mutex<InventoryModel>,
    pub activity: RwLock<ActivityLog>,
    store: RwLock<Option<RecordStore>>,
}

impl AppState {
    /// Opens storage for `settings` and loads the items.
    ///
    /// In database mode a store that cannot be opened at all is not fatal:
    /// the app starts on an empty in-memory inventory and logs the error.
    pub async fn bootstrap(settings: AppSettings) -> AppResult<Self> {
        let config = ConfigStore::new(settings.config_path());
        info!(
            storage = %settings.storage,
            data_dir = %settings.data_dir().display(),
            "Bootstrapping inventory"
        );

        let (source, activity, store) = match settings.storage {
            StorageMode::FlatFile => (
                ItemSource::FlatFile(FlatFileMirror::new(settings.mirror_path())),
                ActivityLog::file(LocalLogFile::new(settings.log_path()), config.clone()),
                None,
            ),
            StorageMode::Database => {
                let descriptor = saved_descriptor(&config);
                match RecordStore::connect(descriptor, settings.db_config()).await {
                    Ok(store) => (
                        ItemSource::Database {
                            store: store.clone(),
                            mirror: FlatFileMirror::new(settings.mirror_path()),
                        },
                        ActivityLog::database(store.clone(), config.clone()),
                        Some(store),
                    ),
                    Err(e) => {
                        error!(error = %e, "No database available, running in memory");
                        (ItemSource::Memory, ActivityLog::memory(config.clone()), None)
                    }
                }
            }
        };

        let inventory = InventoryModel::load(source).await?;
        info!(
            source = inventory.source_name(),
            items = inventory.items().len(),
            "Inventory ready"
        );

        Ok(AppState {
            settings,
            config,
            inventory: Mutex::new(inventory),
            activity: RwLock::new(activity),
            store: RwLock::new(store),
        })
    }

    /// The open record store, if any.
    pub async fn record_store(&self) -> Option<RecordStore> {
        self.store.read().await.clone()
    }

    /// Connection settings as currently saved in the config file.
    pub fn saved_descriptor(&self) -> ConnectionDescriptor {
        saved_descriptor(&self.config)
    }

    /// Reopens the record store with the saved connection settings.
    ///
    /// Leaves memory mode when it succeeds. On failure the current storage
    /// stays active.
    pub async fn reconnect(&self) -> AppResult<BackendKind> {
        if self.settings.storage == StorageMode::FlatFile {
            return Err(AppError::DatabaseDisabled);
        }

        let descriptor = self.saved_descriptor();
        let mut inventory = self.inventory.lock().await;

        if let Some(store) = self.record_store().await {
            let kind = store.reconnect_with(descriptor).await?;
            inventory.refresh().await?;
            return Ok(kind);
        }

        let store = RecordStore::connect(descriptor, self.settings.db_config()).await?;
        let kind = store.backend_kind().await;

        inventory
            .replace_source(ItemSource::Database {
                store: store.clone(),
                mirror: FlatFileMirror::new(self.settings.mirror_path()),
            })
            .await?;
        *self.activity.write().await = ActivityLog::database(store.clone(), self.config.clone());
        *self.store.write().await = Some(store);

        info!(backend = %kind, "Left memory mode");
        Ok(kind)
    }
}

fn saved_descriptor(config: &ConfigStore) -> ConnectionDescriptor {
    ConnectionDescriptor::from_lookup(|key| config.load(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_database_mode_uses_embedded_fallback() {
        let dir = tempfile::tempdir().unwrap();

        let state = AppState::bootstrap(AppSettings::with_data_dir(dir.path()))
            .await
            .unwrap();

        let store = state.record_store().await.unwrap();
        assert_eq!(store.backend_kind().await, BackendKind::Embedded);
        assert!(dir.path().join("inventory.db").exists());
        assert_eq!(state.inventory.lock().await.source_name(), "database");
    }

    #[tokio::test]
    async fn test_unopenable_store_degrades_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        fs::write(&data_dir, "a file where the directory should be").unwrap();

        let state = AppState::bootstrap(AppSettings::with_data_dir(&data_dir))
            .await
            .unwrap();

        assert!(state.record_store().await.is_none());
        assert_eq!(state.inventory.lock().await.source_name(), "memory");
        assert_eq!(state.activity.read().await.sink_name(), "memory");
    }

    #[tokio::test]
    async fn test_flat_file_mode() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::with_data_dir(dir.path()).storage(StorageMode::FlatFile);

        let state = AppState::bootstrap(settings).await.unwrap();

        assert!(state.record_store().await.is_none());
        assert_eq!(state.inventory.lock().await.source_name(), "file");
        assert_eq!(state.activity.read().await.sink_name(), "file");
        assert!(matches!(
            state.reconnect().await.unwrap_err(),
            AppError::DatabaseDisabled
        ));
    }

    #[tokio::test]
    async fn test_reconnect_keeps_items() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::bootstrap(AppSettings::with_data_dir(dir.path()))
            .await
            .unwrap();
        state
            .inventory
            .lock()
            .await
            .add_item("Drill", "004", 12)
            .await
            .unwrap();

        let kind = state.reconnect().await.unwrap();

        assert_eq!(kind, BackendKind::Embedded);
        assert_eq!(state.inventory.lock().await.items().len(), 1);
    }
}
