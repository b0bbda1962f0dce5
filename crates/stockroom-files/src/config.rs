//! # Config Store
//!
//! Persistent user configuration in `data/config.json`.
//!
//! ## Document Format
//! ```json
//! {
//!     "database": "c2hvcA==",
//!     "host": "bG9jYWxob3N0",
//!     "language": "c2k=",
//!     "user": "cm9vdA=="
//! }
//! ```
//!
//! A flat object of key → standard Base64 of the UTF-8 value. Base64 only
//! keeps credentials from being read at a glance; anyone with the file can
//! decode it.
//!
//! ## Failure Policy
//! ```text
//! missing file          → every key absent
//! corrupt / non-object  → every key absent, warn!
//! value not decodable   → that key absent, warn!
//! save failure          → ConfigError
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::atomic::write_atomically;
use crate::error::{ConfigError, ConfigResult};

/// Default location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "data/config.json";

/// Key/value configuration backed by one JSON file.
///
/// Every call reads the file fresh, so edits by other processes between
/// calls are picked up. Saving rewrites the whole document.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the decoded value of `key`, or `None` when it is not stored.
    pub fn load(&self, key: &str) -> Option<String> {
        let document = self.read_document();

        let encoded = match document.get(key)? {
            Value::String(encoded) => encoded,
            other => {
                warn!(key, value = %other, "Config value is not a string, ignoring");
                return None;
            }
        };

        match decode(encoded) {
            Some(value) => Some(value),
            None => {
                warn!(key, path = %self.path.display(), "Config value is not valid Base64 text, ignoring");
                None
            }
        }
    }

    /// Stores one key, keeping every other key in the document.
    pub fn save(&self, key: &str, value: &str) -> ConfigResult<()> {
        self.save_all([(key, value)])
    }

    /// Stores several keys with a single rewrite of the file.
    pub fn save_all<'a, I>(&self, entries: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut document = self.read_document();
        let mut keys = Vec::new();

        for (key, value) in entries {
            document.insert(key.to_string(), Value::String(BASE64.encode(value)));
            keys.push(key);
        }

        let contents = to_pretty_json(&document)?;
        write_atomically(&self.path, |file| {
            std::io::Write::write_all(file, &contents)
        })
        .map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), ?keys, "Config saved");
        Ok(())
    }

    /// Reads the document leniently: anything unusable is an empty object.
    fn read_document(&self) -> Map<String, Value> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Config file not found, using empty config");
                return Map::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read config. Using empty config.");
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(path = %self.path.display(), "Config is not a JSON object. Using empty config.");
                Map::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Config is corrupt. Using empty config.");
                Map::new()
            }
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        ConfigStore::new(DEFAULT_CONFIG_PATH)
    }
}

fn decode(encoded: &str) -> Option<String> {
    let bytes = BASE64.decode(encoded.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// Pretty JSON with a 4-space indent.
fn to_pretty_json(document: &Map<String, Value>) -> ConfigResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

// =============================================================================
// Unit Tests
// =============================================================================
