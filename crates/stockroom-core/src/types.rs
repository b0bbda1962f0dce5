//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │   ItemRecord    │   │    LogEntry     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name           │   │  id (row key)   │   │  actor          │       │
//! │  │  code (unique)  │   │  name           │   │  timestamp      │       │
//! │  │  quantity (u32) │   │  code           │   │  message        │       │
//! │  │                 │   │  quantity       │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │    CSV mirror row        database row          append-only             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! A stored item has:
//! - `id`: auto-increment primary key, used for update/delete
//! - `code`: product code, unique, what people scan and type

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::{LOG_TIMESTAMP_FORMAT, MAX_QUANTITY};

// =============================================================================
// Item
// =============================================================================

/// One inventory line, keyed by its product code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Display name.
    pub name: String,

    /// Product code - business identifier, unique across all items.
    pub code: String,

    /// Units on hand. Never negative.
    pub quantity: u32,
}

impl Item {
    /// Creates an item.
    pub fn new(name: impl Into<String>, code: impl Into<String>, quantity: u32) -> Self {
        Item {
            name: name.into(),
            code: code.into(),
            quantity,
        }
    }

    /// Returns a copy with `delta` more units on hand.
    ///
    /// ## Errors
    /// [`CoreError::QuantityOverflow`] when the result would exceed
    /// [`MAX_QUANTITY`].
    pub fn restocked(&self, delta: u32) -> CoreResult<Item> {
        let quantity = self
            .quantity
            .checked_add(delta)
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or_else(|| CoreError::QuantityOverflow {
                code: self.code.clone(),
                current: self.quantity,
                delta,
            })?;

        Ok(Item {
            quantity,
            ..self.clone()
        })
    }

    /// Search predicate: case-insensitive on the name, substring on the code.
    ///
    /// An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term.to_lowercase()) || self.code.contains(term)
    }
}

// =============================================================================
// Item Record
// =============================================================================

/// An item as stored by the record store, with its primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Auto-increment primary key.
    pub id: i64,

    pub name: String,

    pub code: String,

    pub quantity: u32,
}

impl ItemRecord {
    /// Drops the row key.
    pub fn to_item(&self) -> Item {
        Item::new(self.name.clone(), self.code.clone(), self.quantity)
    }
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        Item {
            name: record.name,
            code: record.code,
            quantity: record.quantity,
        }
    }
}

// =============================================================================
// Log Entry
// =============================================================================

/// One immutable audit record.
///
/// `actor` is `None` for entries read from the local log file, which never
/// recorded who acted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub actor: Option<String>,

    /// Clock of whoever stored the entry (database server or local machine).
    pub timestamp: NaiveDateTime,

    pub message: String,
}

impl LogEntry {
    /// Timestamp rendered as `HH:MM:SS DD-MM-YYYY`.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(LOG_TIMESTAMP_FORMAT).to_string()
    }

    /// Filter predicate used by the log view: case-insensitive match on the
    /// formatted timestamp or the message.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.formatted_timestamp().to_lowercase().contains(&term)
            || self.message.to_lowercase().contains(&term)
    }
}

// =============================================================================
// Language
// =============================================================================

/// UI language preference, persisted under the `language` config key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,

    #[serde(rename = "si")]
    Slovenian,
}

impl Language {
    /// Two-letter code stored in the config file.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Slovenian => "si",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::English),
            "si" | "sl" => Ok(Language::Slovenian),
            _ => Err(ValidationError::NotAllowed {
                field: "language".to_string(),
                allowed: vec!["en".to_string(), "si".to_string()],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
