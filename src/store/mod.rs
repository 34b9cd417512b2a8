//! Spreadsheet persistence
//!
//! Each domain store wraps a [`Sheet`]: one CSV file holding one table,
//! read in full and rewritten in full on every mutation. There is no
//! locking; concurrent writers are last-writer-wins by design.

pub mod records;
pub mod scores;
pub mod tasks;
pub mod topics;

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub use records::RecordStore;
pub use scores::ScoreStore;
pub use tasks::TaskStore;
pub use topics::TopicStore;

/// Errors from the spreadsheet layer
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] csv::Error),
}

/// A single CSV-backed table of `T` rows
///
/// The file (and its parent directory) is created on open; an empty file
/// reads as an empty table.
pub struct Sheet<T> {
    path: PathBuf,
    _row: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> Sheet<T> {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            fs::File::create(&path)?;
        }
        Ok(Self {
            path,
            _row: PhantomData,
        })
    }

    /// Read every row of the table
    pub fn read_all(&self) -> Result<Vec<T>, StoreError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(rows)
    }

    /// Replace the whole table
    pub fn write_all(&self, rows: &[T]) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Append one row (read-modify-rewrite, keeping column order stable)
    pub fn append(&self, row: T) -> Result<(), StoreError> {
        let mut rows = self.read_all()?;
        rows.push(row);
        self.write_all(&rows)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse a YYYY-MM-DD date column value
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
