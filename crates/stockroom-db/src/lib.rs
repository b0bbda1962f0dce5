//! # stockroom-db: Record Store for Stockroom
//!
//! Durable storage for inventory rows and the audit log, on a MySQL server
//! when one is reachable and on a local SQLite file otherwise.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  Command (scan_item)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  RecordStore  │    │  Repositories │    │    Schema    │  │   │
//! │  │   │  (store.rs)   │    │  (item, log)  │    │ (schema.rs)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ connect +     │◄───│ ItemRepo      │    │ inventory    │  │   │
//! │  │   │ fallback +    │    │ LogRepo       │    │ logs         │  │   │
//! │  │   │ reconnect     │    │               │    │              │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │   ┌───────▼───────┐                                             │   │
//! │  │   │    Backend    │  Networked(MySqlPool) | Embedded(SqlitePool)│   │
//! │  │   │ (backend.rs)  │  dialect, transactions                      │   │
//! │  │   └───────────────┘                                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Connection management and configuration
//! - [`backend`] - The two engines, dialects and statement execution
//! - [`descriptor`] - Networked backend connection parameters
//! - [`schema`] - Table definitions
//! - [`error`] - Database error types
//! - [`repository`] - Item and log repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{ConnectionDescriptor, DbConfig, RecordStore};
//!
//! let descriptor = ConnectionDescriptor::new("localhost", 3306, "root", "", "shop");
//! let store = RecordStore::connect(descriptor, DbConfig::default()).await?;
//!
//! let drill = store.items().add("Drill", "004", 12).await?;
//! store.logs().append("Server", "Added Drill (code 004) with quantity 12").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod descriptor;
pub mod error;
pub mod repository;
pub mod schema;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{BackendKind, Dialect, ExecOutcome, Param, Statement};
pub use descriptor::ConnectionDescriptor;
pub use error::{DbError, DbResult};
pub use store::{DbConfig, RecordStore};

// Repository re-exports for convenience
pub use repository::item::ItemRepository;
pub use repository::log::LogRepository;
