//! # Commands Module
//!
//! Everything the UI layer calls. Each command is an `async fn` taking the
//! shared [`AppState`](crate::state::AppState) and returning
//! `Result<T, ApiError>`.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── items.rs    ◄─── List, add, edit, scan, remove, search
//! ├── logs.rs     ◄─── Activity log view and filter
//! └── config.rs   ◄─── Settings, connection, language
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  UI: "Scan" dialog submits code 004, quantity 3                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  scan_item(&state, "004", 3)                                            │
//! │         │                                                               │
//! │         ├── lock inventory                                              │
//! │         ├── InventoryModel::scan      (durable write + refresh)         │
//! │         ├── ActivityLog::record       (only after the write)            │
//! │         ▼                                                               │
//! │  Ok(ItemDto { name: "Drill", code: "004", quantity: 15 })               │
//! │  Err(ApiError { code: NOT_FOUND, message: "Product code ..." })         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod items;
pub mod logs;
