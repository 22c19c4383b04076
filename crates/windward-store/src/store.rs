//! JSON-file record store.
//!
//! Records live in a single JSON array on disk, newest date first.
//! Writes go through a temp file in the same directory followed by an
//! atomic rename, so readers never observe a half-written store.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use windward_core::domain::DailySignalRecord;

use crate::error::StoreError;

/// Result of an upsert pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub replaced: usize,
}

/// Storage contract for daily signal records.
///
/// A date identifies a record: upserting an existing date replaces the
/// whole record for that day.
pub trait RecordStore {
    /// All records, newest date first.
    fn load_all(&self) -> Result<Vec<DailySignalRecord>, StoreError>;

    /// Insert or replace records keyed by date.
    fn upsert_batch(&self, records: &[DailySignalRecord]) -> Result<UpsertOutcome, StoreError>;

    /// Remove every record.
    fn clear(&self) -> Result<(), StoreError>;
}

/// [`RecordStore`] backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, records: &[DailySignalRecord]) -> Result<(), StoreError> {
        let parent = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }
        let temp = NamedTempFile::new_in(parent.unwrap_or_else(|| Path::new(".")))?;
        serde_json::to_writer_pretty(&temp, records)?;
        temp.persist(&self.path)?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<DailySignalRecord>, StoreError> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        // The array itself must parse; individual records may not, e.g.
        // rows written by an older schema. Those are skipped, not fatal.
        let values: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<DailySignalRecord>(value) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(target: "windward::store", error = %err, "skipping malformed record");
                }
            }
        }
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    fn upsert_batch(&self, records: &[DailySignalRecord]) -> Result<UpsertOutcome, StoreError> {
        let mut existing = self.load_all()?;
        let mut outcome = UpsertOutcome::default();

        for record in records {
            match existing.iter().position(|r| r.date == record.date) {
                Some(index) => {
                    existing[index] = record.clone();
                    outcome.replaced += 1;
                }
                None => {
                    existing.push(record.clone());
                    outcome.inserted += 1;
                }
            }
        }

        existing.sort_by(|a, b| b.date.cmp(&a.date));
        self.write_atomic(&existing)?;
        Ok(outcome)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.write_atomic(&[])
    }
}
