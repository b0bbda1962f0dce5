//! # Local Log File
//!
//! Append-only activity log for the flat-file deployment, `data/inventory.log`.
//!
//! ```text
//! 14:03:59 16-10-2026,Added Drill (code 004) with quantity 12
//! 14:04:10 16-10-2026,"Removed Nuts, bolts (code NB-1)"
//! ```
//!
//! Each entry is encoded in memory first and reaches the file in a single
//! `write_all` on a file opened in append mode, followed by `sync_data`.
//! The file never records who acted.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, Timelike};
use tracing::{debug, warn};

use stockroom_core::{LogEntry, LOG_TIMESTAMP_FORMAT};

use crate::atomic::ensure_parent_dir;
use crate::error::{LocalLogError, LocalLogResult};

/// Default location, relative to the working directory.
pub const DEFAULT_LOG_PATH: &str = "data/inventory.log";

#[derive(Debug, Clone)]
pub struct LocalLogFile {
    path: PathBuf,
}

impl LocalLogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalLogFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `message` stamped with the local clock.
    ///
    /// Returns the entry as it will read back.
    pub fn append(&self, message: &str) -> LocalLogResult<LogEntry> {
        // The file keeps whole seconds only
        let now = Local::now().naive_local();
        let timestamp = now.with_nanosecond(0).unwrap_or(now);
        let row = encode_row(&timestamp, message)?;

        let io_err = |source: io::Error| LocalLogError::Io {
            path: self.path.clone(),
            source,
        };

        ensure_parent_dir(&self.path).map_err(io_err)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(&row).map_err(io_err)?;
        file.sync_data().map_err(io_err)?;

        debug!(path = %self.path.display(), "Log entry appended");
        Ok(LogEntry {
            actor: None,
            timestamp,
            message: message.to_string(),
        })
    }

    /// Every well-formed entry in file order. A missing file has none.
    pub fn read(&self) -> LocalLogResult<Vec<LogEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(LocalLogError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut entries = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let line = index + 1;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(line, error = %e, "Skipping unreadable log row");
                    continue;
                }
            };

            let Some(raw_timestamp) = record.get(0) else {
                continue;
            };
            if record.len() < 2 {
                warn!(line, "Skipping log row without a message");
                continue;
            }

            let timestamp =
                match NaiveDateTime::parse_from_str(raw_timestamp.trim(), LOG_TIMESTAMP_FORMAT) {
                    Ok(timestamp) => timestamp,
                    Err(e) => {
                        warn!(line, value = raw_timestamp, error = %e, "Skipping log row with bad timestamp");
                        continue;
                    }
                };

            // Unquoted commas in hand-edited files split the message
            let message = record.iter().skip(1).collect::<Vec<_>>().join(",");

            entries.push(LogEntry {
                actor: None,
                timestamp,
                message,
            });
        }

        Ok(entries)
    }
}

impl Default for LocalLogFile {
    fn default() -> Self {
        LocalLogFile::new(DEFAULT_LOG_PATH)
    }
}

/// One CSV row, terminator included.
fn encode_row(timestamp: &NaiveDateTime, message: &str) -> LocalLogResult<Vec<u8>> {
    let formatted = timestamp.format(LOG_TIMESTAMP_FORMAT).to_string();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([formatted.as_str(), message])?;
    writer
        .into_inner()
        .map_err(|e| LocalLogError::Csv(csv::Error::from(e.into_error())))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_append_then_read_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = LocalLogFile::new(dir.path().join("data").join("inventory.log"));

        let first = log.append("Added Drill (code 004) with quantity 12").unwrap();
        let second = log.append("Removed Nuts, bolts (code NB-1)").unwrap();

        let entries = log.read().unwrap();
        assert_eq!(entries, vec![first, second]);
        assert!(entries[0].timestamp <= entries[1].timestamp);
        assert_eq!(entries[1].message, "Removed Nuts, bolts (code NB-1)");
        assert!(entries.iter().all(|e| e.actor.is_none()));
    }

    #[test]
    fn test_row_format() {
        let dir = tempfile::tempdir().unwrap();
        let log = LocalLogFile::new(dir.path().join("inventory.log"));

        let entry = log.append("Scanned 3 x Drill (code 004), quantity now 15").unwrap();

        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            raw,
            format!(
                "{},\"Scanned 3 x Drill (code 004), quantity now 15\"\n",
                entry.formatted_timestamp()
            )
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = LocalLogFile::new(dir.path().join("inventory.log"));

        assert!(log.read().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let log = LocalLogFile::new(dir.path().join("inventory.log"));
        fs::write(
            log.path(),
            "garbage line\n\
             yesterday,Added Saw (code 005) with quantity 1\n\
             14:03:59 16-10-2026,Added Drill (code 004) with quantity 12\n",
        )
        .unwrap();

        let entries = log.read().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].formatted_timestamp(), "14:03:59 16-10-2026");
    }
}
