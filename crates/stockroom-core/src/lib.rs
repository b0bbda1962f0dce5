//! # stockroom-core: Pure Domain Types for Stockroom
//!
//! Items, log entries and the rules that keep them valid. Everything here is
//! deterministic and free of I/O; the storage crates and the app crate build
//! on these types.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              UI (dialogs, tables, menus - external)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ list_items, add_item, ...              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        stockroom-app (InventoryModel, ActivityLog, commands)    │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼─────────────┐   ┌────────────────▼───────────────┐   │
//! │  │ stockroom-db (RecordStore) │   │ stockroom-files (config, CSV)  │   │
//! │  └──────────────┬─────────────┘   └────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────────────────────▼───────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │    Item • ItemRecord • LogEntry • validation • activity text    │   │
//! │  │          NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, ItemRecord, LogEntry, Language)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation for item fields and quantities
//! - [`activity`] - Human-readable audit messages
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::Item;
//!
//! let drill = Item::new("Drill", "004", 12);
//! let restocked = drill.restocked(3).unwrap();
//! assert_eq!(restocked.quantity, 15);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod activity;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Actor recorded in the activity log when no `user` is configured.
pub const DEFAULT_ACTOR: &str = "Server";

/// Timestamp layout of the local log file and of formatted log entries.
///
/// Example: `14:03:59 16-10-2026`
pub const LOG_TIMESTAMP_FORMAT: &str = "%H:%M:%S %d-%m-%Y";

/// Longest name or code the schema accepts (`VARCHAR(255)`).
pub const MAX_FIELD_LENGTH: usize = 255;

/// Largest quantity either backend can store in a signed `INT` column.
pub const MAX_QUANTITY: u32 = i32::MAX as u32;
