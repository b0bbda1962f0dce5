//! # Repository Module
//!
//! Table-level operations on top of [`RecordStore`](crate::RecordStore).
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Inventory model                                                       │
//! │       │                                                                 │
//! │       │  store.items().restock(id, 3)                                  │
//! │       ▼                                                                 │
//! │  ItemRepository ── builds Statement for the active Dialect             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RecordStore ── reconnects if stale, runs in a transaction             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MySQL  or  SQLite                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ItemRepository`](item::ItemRepository) - `inventory` rows
//! - [`LogRepository`](log::LogRepository) - append-only `logs` rows

pub mod item;
pub mod log;
