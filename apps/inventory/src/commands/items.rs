//! # Item Commands
//!
//! Inventory table actions. Every mutation is written first and logged
//! second; a failed write logs nothing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use stockroom_core::validation::validate_scan_quantity;
use stockroom_core::{activity, CoreError, Item};

use crate::error::ApiError;
use crate::state::AppState;

/// One table row as the UI sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub name: String,
    pub code: String,
    pub quantity: u32,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        ItemDto {
            name: item.name,
            code: item.code,
            quantity: item.quantity,
        }
    }
}

impl From<&Item> for ItemDto {
    fn from(item: &Item) -> Self {
        ItemDto::from(item.clone())
    }
}

/// Every item, in source order.
pub async fn list_items(state: &AppState) -> Result<Vec<ItemDto>, ApiError> {
    let inventory = state.inventory.lock().await;
    Ok(inventory.items().iter().map(ItemDto::from).collect())
}

/// Items whose name or code matches `query`.
pub async fn search_items(state: &AppState, query: &str) -> Result<Vec<ItemDto>, ApiError> {
    debug!(query, "search_items command");

    let inventory = state.inventory.lock().await;
    let hits = inventory.search(query)?;
    Ok(hits.into_iter().map(ItemDto::from).collect())
}

pub async fn add_item(
    state: &AppState,
    name: &str,
    code: &str,
    quantity: i64,
) -> Result<ItemDto, ApiError> {
    debug!(code, quantity, "add_item command");

    let mut inventory = state.inventory.lock().await;
    let item = inventory.add_item(name, code, quantity).await?;
    state
        .activity
        .read()
        .await
        .record(&activity::item_added(&item))
        .await?;

    Ok(item.into())
}

/// Full edit of the item currently coded `code`.
pub async fn update_item(
    state: &AppState,
    code: &str,
    name: &str,
    new_code: &str,
    quantity: i64,
) -> Result<ItemDto, ApiError> {
    debug!(code, new_code, quantity, "update_item command");

    let mut inventory = state.inventory.lock().await;
    let item = inventory.update_item(code, name, new_code, quantity).await?;
    state
        .activity
        .read()
        .await
        .record(&activity::item_updated(code.trim(), &item))
        .await?;

    Ok(item.into())
}

pub async fn set_quantity(state: &AppState, code: &str, quantity: i64) -> Result<ItemDto, ApiError> {
    debug!(code, quantity, "set_quantity command");

    let mut inventory = state.inventory.lock().await;
    let item = inventory.set_quantity(code, quantity).await?;
    state
        .activity
        .read()
        .await
        .record(&activity::quantity_set(&item))
        .await?;

    Ok(item.into())
}

/// Adds `quantity` units to the item with `code`.
pub async fn scan_item(state: &AppState, code: &str, quantity: i64) -> Result<ItemDto, ApiError> {
    debug!(code, quantity, "scan_item command");

    let delta = validate_scan_quantity(quantity).map_err(CoreError::from)?;

    let mut inventory = state.inventory.lock().await;
    let item = inventory.scan(code, i64::from(delta)).await?;
    state
        .activity
        .read()
        .await
        .record(&activity::item_scanned(&item, delta))
        .await?;

    Ok(item.into())
}

pub async fn remove_item(state: &AppState, code: &str) -> Result<(), ApiError> {
    debug!(code, "remove_item command");

    let mut inventory = state.inventory.lock().await;
    let item = inventory.remove_item(code).await?;
    state
        .activity
        .read()
        .await
        .record(&activity::item_removed(&item))
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::{AppSettings, StorageMode};

    async fn file_state(dir: &tempfile::TempDir) -> AppState {
        let settings = AppSettings::with_data_dir(dir.path()).storage(StorageMode::FlatFile);
        AppState::bootstrap(settings).await.unwrap()
    }

    async fn log_count(state: &AppState) -> usize {
        state.activity.read().await.entries().await.unwrap().len()
    }

    #[tokio::test]
    async fn test_mutations_are_logged() {
        let dir = tempfile::tempdir().unwrap();
        let state = file_state(&dir).await;

        add_item(&state, "Saw", "005", 1).await.unwrap();
        set_quantity(&state, "005", 4).await.unwrap();
        update_item(&state, "005", "Hand saw", "005-B", 4).await.unwrap();
        remove_item(&state, "005-B").await.unwrap();

        let messages: Vec<String> = state
            .activity
            .read()
            .await
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Added Saw (code 005) with quantity 1",
                "Set quantity of Saw (code 005) to 4",
                "Updated Hand saw (code 005 -> 005-B): quantity 4",
                "Removed Hand saw (code 005-B)",
            ]
        );
        assert!(list_items(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_logs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = file_state(&dir).await;
        add_item(&state, "Drill", "004", 12).await.unwrap();

        let err = add_item(&state, "Other drill", "004", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateCode);

        let err = scan_item(&state, "999", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product code '999' not found!");

        let err = add_item(&state, "", "006", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(log_count(&state).await, 1);
    }

    #[tokio::test]
    async fn test_scan_logs_delta() {
        let dir = tempfile::tempdir().unwrap();
        let state = file_state(&dir).await;
        add_item(&state, "Drill", "004", 12).await.unwrap();

        let dto = scan_item(&state, "004", 3).await.unwrap();

        assert_eq!(dto.quantity, 15);
        let entries = state.activity.read().await.entries().await.unwrap();
        assert_eq!(
            entries[1].message,
            "Scanned 3 x Drill (code 004), quantity now 15"
        );
    }

    #[tokio::test]
    async fn test_search_items() {
        let dir = tempfile::tempdir().unwrap();
        let state = file_state(&dir).await;
        add_item(&state, "Cordless Drill", "PWR-001", 2).await.unwrap();
        add_item(&state, "Claw Hammer", "HND-001", 5).await.unwrap();

        let hits = search_items(&state, "DRILL").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "PWR-001");

        assert_eq!(search_items(&state, "-001").await.unwrap().len(), 2);
    }
}
