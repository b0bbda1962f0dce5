//! # Schema
//!
//! Table definitions for both backends, applied on connect.
//!
//! ## Tables
//! ```text
//! inventory                         logs
//! ─────────────────────────         ─────────────────────────
//! id    auto-increment PK           id         auto-increment PK
//! name  text                        user_id    text (actor)
//! code  text, UNIQUE                timestamp  set by the backend
//! qty   integer                     message    text
//! ```
//!
//! Every statement is `CREATE TABLE IF NOT EXISTS`, so running them against
//! an existing database changes nothing. There is no migration history;
//! columns are never altered in place.

use crate::backend::BackendKind;

const MYSQL_INVENTORY: &str = r#"
CREATE TABLE IF NOT EXISTS inventory (
    id INT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    code VARCHAR(255) NOT NULL UNIQUE,
    qty INT NOT NULL DEFAULT 0
)
"#;

const MYSQL_LOGS: &str = r#"
CREATE TABLE IF NOT EXISTS logs (
    id INT AUTO_INCREMENT PRIMARY KEY,
    user_id VARCHAR(255) NOT NULL,
    timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    message TEXT NOT NULL
)
"#;

const SQLITE_INVENTORY: &str = r#"
CREATE TABLE IF NOT EXISTS inventory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    code TEXT NOT NULL UNIQUE,
    qty INTEGER NOT NULL DEFAULT 0
)
"#;

const SQLITE_LOGS: &str = r#"
CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    message TEXT NOT NULL
)
"#;

/// DDL for `kind`, in execution order.
pub fn create_statements(kind: BackendKind) -> &'static [&'static str] {
    match kind {
        BackendKind::Networked => &[MYSQL_INVENTORY, MYSQL_LOGS],
        BackendKind::Embedded => &[SQLITE_INVENTORY, SQLITE_LOGS],
    }
}
