//! # stockroom-files: File-Backed Stores
//!
//! The plain-file side of Stockroom's persistence.
//!
//! ## Stores
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ConfigStore      data/config.json    key → Base64, read-modify-write   │
//! │  FlatFileMirror   data/inventory.csv  whole-file snapshot of items      │
//! │  LocalLogFile     data/inventory.log  append-only activity rows         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All three are synchronous and cheap to clone (they only hold a path).
//! Whole-file rewrites are crash-atomic via [`atomic::write_atomically`].

pub mod atomic;
pub mod config;
pub mod error;
pub mod local_log;
pub mod mirror;

pub use config::ConfigStore;
pub use error::{
    ConfigError, ConfigResult, LocalLogError, LocalLogResult, MirrorError, MirrorResult,
};
pub use local_log::LocalLogFile;
pub use mirror::FlatFileMirror;
