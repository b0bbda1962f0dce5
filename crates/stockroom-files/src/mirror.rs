//! # Flat-File Mirror
//!
//! The item table as a CSV file, for the flat-file deployment and for other
//! tools that read `data/inventory.csv`.
//!
//! ```text
//! Name,Code,Quantity
//! Drill,004,15
//! "Nuts, bolts",NB-1,200
//! ```
//!
//! Writes always replace the whole file (see [`crate::atomic`]).

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use stockroom_core::validation::validate_quantity;
use stockroom_core::Item;

use crate::atomic::write_atomically;
use crate::error::{MirrorError, MirrorResult};

/// Default location, relative to the working directory.
pub const DEFAULT_MIRROR_PATH: &str = "data/inventory.csv";

pub const HEADER: [&str; 3] = ["Name", "Code", "Quantity"];

/// CSV snapshot of every item.
#[derive(Debug, Clone)]
pub struct FlatFileMirror {
    path: PathBuf,
}

impl FlatFileMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FlatFileMirror { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file with `items`, header first.
    pub fn write(&self, items: &[Item]) -> MirrorResult<()> {
        write_atomically(&self.path, |file| write_rows(file, items)).map_err(|source| {
            MirrorError::Io {
                path: self.path.clone(),
                source,
            }
        })?;

        debug!(path = %self.path.display(), count = items.len(), "Mirror written");
        Ok(())
    }

    /// Reads every item. A missing file is an empty inventory.
    ///
    /// ## Errors
    /// [`MirrorError::InvalidRow`] on the first row that is short or whose
    /// quantity is not a non-negative integer.
    pub fn read(&self) -> MirrorResult<Vec<Item>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(MirrorError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut items = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.len() < HEADER.len() {
                return Err(MirrorError::InvalidRow {
                    line,
                    reason: format!("expected {} fields, found {}", HEADER.len(), record.len()),
                });
            }

            let raw_quantity = record[2].trim();
            let quantity = raw_quantity
                .parse::<i64>()
                .ok()
                .and_then(|q| validate_quantity(q).ok())
                .ok_or_else(|| MirrorError::InvalidRow {
                    line,
                    reason: format!("quantity '{}' is not a non-negative integer", raw_quantity),
                })?;

            items.push(Item::new(&record[0], &record[1], quantity));
        }

        debug!(path = %self.path.display(), count = items.len(), "Mirror read");
        Ok(items)
    }
}

impl Default for FlatFileMirror {
    fn default() -> Self {
        FlatFileMirror::new(DEFAULT_MIRROR_PATH)
    }
}

fn write_rows(file: &mut File, items: &[Item]) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(HEADER)?;
    for item in items {
        let quantity = item.quantity.to_string();
        writer.write_record([item.name.as_str(), item.code.as_str(), quantity.as_str()])?;
    }
    writer.flush()
}

// =============================================================================
// Unit Tests
// =============================================================================
