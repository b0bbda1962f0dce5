//! # Stockroom App Library
//!
//! The inventory core as one library: state, commands, and the error type
//! the UI sees. A desktop shell links this crate and calls the commands; the
//! `stockroom` binary runs it headless.
//!
//! ## Module Organization
//! ```text
//! stockroom_app/
//! ├── lib.rs          ◄─── You are here (tracing, headless run)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState + bootstrap
//! │   ├── settings.rs ◄─── AppSettings::from_env, StorageMode
//! │   ├── inventory.rs◄─── InventoryModel, ItemSource
//! │   └── activity.rs ◄─── ActivityLog sinks
//! ├── commands/
//! │   ├── items.rs    ◄─── Item table actions
//! │   ├── logs.rs     ◄─── Activity log view
//! │   └── config.rs   ◄─── Settings dialog actions
//! └── error.rs        ◄─── AppError, ApiError
//! ```

pub mod commands;
pub mod error;
pub mod state;

use tracing::info;
use tracing_subscriber::EnvFilter;

pub use error::{ApiError, AppError, AppResult, ErrorCode};
pub use state::{AppSettings, AppState, StorageMode};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,stockroom=debug,sqlx=warn";

/// How many log entries the headless run prints.
const RECENT_LOG_LIMIT: usize = 10;

/// Bootstraps from the environment and prints the inventory and the most
/// recent activity.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging      tracing-subscriber, RUST_LOG overrides      │
/// │  2. Read Settings           STOCKROOM_DATA_DIR / _STORAGE / _TIMEOUT    │
/// │  3. Open Storage            MySQL → SQLite → memory, or flat files      │
/// │  4. Print                   items table, last entries of the log        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), ApiError> {
    init_tracing();

    let settings = AppSettings::from_env();
    info!(?settings, "Starting Stockroom");

    let state = AppState::bootstrap(settings).await?;

    let items = commands::items::list_items(&state).await?;
    println!("{:<32} {:<16} {:>10}", "Name", "Code", "Quantity");
    for item in &items {
        println!("{:<32} {:<16} {:>10}", item.name, item.code, item.quantity);
    }
    println!("{} item(s)", items.len());

    let logs = commands::logs::list_logs(&state).await?;
    let skip = logs.len().saturating_sub(RECENT_LOG_LIMIT);
    println!();
    for entry in logs.iter().skip(skip) {
        match &entry.actor {
            Some(actor) => println!("{}  {:<12} {}", entry.timestamp, actor, entry.message),
            None => println!("{}  {}", entry.timestamp, entry.message),
        }
    }

    if let Some(store) = state.record_store().await {
        store.close().await;
    }
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockroom=trace` - Show trace for stockroom crates only
/// - Default: INFO, DEBUG for stockroom crates
pub fn init_tracing() {
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();
}

/// `RUST_LOG` if it parses, otherwise [`DEFAULT_LOG_FILTER`].
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_default_filter_caps_verbosity() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();

        // Nothing enables trace, so the subscriber must not either
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
