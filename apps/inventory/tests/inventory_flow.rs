//! End-to-end runs through the command API, as the UI drives it.

use stockroom_app::commands::{config, items, logs};
use stockroom_app::{AppSettings, AppState, ErrorCode, StorageMode};
use stockroom_files::FlatFileMirror;

async fn database_state(dir: &tempfile::TempDir) -> AppState {
    AppState::bootstrap(AppSettings::with_data_dir(dir.path()))
        .await
        .unwrap()
}

#[tokio::test]
async fn add_then_scan_is_logged_twice() {
    let dir = tempfile::tempdir().unwrap();
    let state = database_state(&dir).await;

    items::add_item(&state, "Drill", "004", 12).await.unwrap();
    let scanned = items::scan_item(&state, "004", 3).await.unwrap();

    assert_eq!(scanned.quantity, 15);
    assert_eq!(items::list_items(&state).await.unwrap(), vec![scanned]);

    let entries = logs::list_logs(&state).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.message.contains("004")));
    assert!(entries.iter().all(|e| e.actor.as_deref() == Some("Server")));
    assert_eq!(logs::filter_logs(&state, "scanned").await.unwrap().len(), 1);
}

#[tokio::test]
async fn database_mode_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let state = database_state(&dir).await;
        config::config_set(&state, "user", "alice").await.unwrap();
        items::add_item(&state, "Nuts, bolts", "NB-1", 200).await.unwrap();
        items::add_item(&state, "Saw", "005", 1).await.unwrap();
        items::remove_item(&state, "005").await.unwrap();
        state.record_store().await.unwrap().close().await;
    }

    let state = database_state(&dir).await;
    let listed = items::list_items(&state).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Nuts, bolts");

    let entries = logs::list_logs(&state).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].message, "Removed Saw (code 005)");
    assert_eq!(entries[0].actor.as_deref(), Some("alice"));

    // The CSV snapshot follows the database
    let mirror = FlatFileMirror::new(state.settings.mirror_path());
    assert_eq!(mirror.read().unwrap().len(), 1);
}

#[tokio::test]
async fn bad_row_does_not_block_writes() {
    let dir = tempfile::tempdir().unwrap();
    let settings = AppSettings::with_data_dir(dir.path());

    // Another client left a row with a negative quantity behind
    {
        let options = sqlx::sqlite::SqliteConnectOptions::new()
            .filename(settings.database_path())
            .create_if_missing(true);
        let pool = sqlx::SqlitePool::connect_with(options).await.unwrap();
        sqlx::query(
            "CREATE TABLE inventory (id INTEGER PRIMARY KEY AUTOINCREMENT, \
             name TEXT NOT NULL, code TEXT NOT NULL UNIQUE, qty INTEGER NOT NULL DEFAULT 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO inventory (name, code, qty) VALUES ('Ghost', 'X-1', -1)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    let state = AppState::bootstrap(settings).await.unwrap();
    assert!(items::list_items(&state).await.unwrap().is_empty());

    let added = items::add_item(&state, "Drill", "004", 12).await.unwrap();
    items::scan_item(&state, "004", 3).await.unwrap();

    let listed = items::list_items(&state).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].code, added.code);
    assert_eq!(listed[0].quantity, 15);
    assert_eq!(logs::list_logs(&state).await.unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_code_keeps_existing_row() {
    let dir = tempfile::tempdir().unwrap();
    let state = database_state(&dir).await;
    items::add_item(&state, "Drill", "004", 12).await.unwrap();

    let err = items::add_item(&state, "Impostor", "004", 99).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::DuplicateCode);
    let listed = items::list_items(&state).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Drill");
    assert_eq!(listed[0].quantity, 12);
    assert_eq!(logs::list_logs(&state).await.unwrap().len(), 1);
}

#[tokio::test]
async fn flat_file_mode_uses_csv_and_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = AppSettings::with_data_dir(dir.path()).storage(StorageMode::FlatFile);

    {
        let state = AppState::bootstrap(settings.clone()).await.unwrap();
        items::add_item(&state, "Drill", "004", 12).await.unwrap();
        items::set_quantity(&state, "004", 20).await.unwrap();
    }

    assert!(!dir.path().join("inventory.db").exists());
    assert!(settings.log_path().exists());

    let state = AppState::bootstrap(settings).await.unwrap();
    let listed = items::list_items(&state).await.unwrap();
    assert_eq!(listed[0].quantity, 20);

    let entries = logs::list_logs(&state).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.actor.is_none()));
}
