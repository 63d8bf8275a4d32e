//! @ai:module:intent Append-only JSON-lines metric store
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonlStore

use crate::error::Result;
use crate::metrics::MetricRecord;
use crate::store::{MetricStore, RecordFilter};
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// @ai:intent File-backed store, one JSON record per line
///
/// Appends stamp the record timestamp, clamped to never move backwards
/// even when the wall clock does. Records land in append order, so reads
/// come back already sorted.
pub struct JsonlStore {
    path: PathBuf,
    last_stamp: Mutex<Option<DateTime<Utc>>>,
}

impl JsonlStore {
    /// @ai:intent Open a store at the given file path
    /// @ai:post parent directory is created on first append, not here
    /// @ai:effects pure
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_stamp: Mutex::new(None),
        }
    }

    /// @ai:intent Path of the backing file
    /// @ai:effects pure
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn stamp(&self) -> DateTime<Utc> {
        let mut last = match self.last_stamp.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut now = Utc::now();
        if let Some(previous) = *last {
            if now < previous {
                now = previous;
            }
        }
        *last = Some(now);

        now
    }
}

impl MetricStore for JsonlStore {
    /// @ai:intent Validate, timestamp and persist one record
    /// @ai:post returned record carries the stamped timestamp
    /// @ai:effects fs:write
    fn append(&self, mut record: MetricRecord) -> Result<MetricRecord> {
        record.timestamp = self.stamp();
        record.validate()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let line = serde_json::to_string(&record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        Ok(record)
    }

    /// @ai:intent Read matching records in ascending timestamp order
    /// @ai:post missing backing file reads as empty, not as an error
    /// @ai:effects fs:read
    fn query(&self, filter: &RecordFilter) -> Result<Vec<MetricRecord>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record: MetricRecord = serde_json::from_str(&line)?;
            if filter.matches(&record) {
                records.push(record);
            }
        }

        // Append order is timestamp order, but merge-edited files are not
        records.sort_by_key(|r| r.timestamp);

        Ok(records)
    }
}
