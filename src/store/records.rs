//! Study time records
//!
//! One row per date holding the studied hours; saving an existing date
//! overwrites it.

use super::{Sheet, StoreError, parse_date};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One study record as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRecordRow {
    /// Date, YYYY-MM-DD
    pub date: String,
    /// Studied time in fractional hours
    pub hours: f64,
}

pub struct RecordStore {
    sheet: Sheet<StudyRecordRow>,
}

impl RecordStore {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            sheet: Sheet::open(data_dir.join("study_records.csv"))?,
        })
    }

    pub fn get(&self, date: &str) -> Result<Option<StudyRecordRow>, StoreError> {
        let rows = self.sheet.read_all()?;
        Ok(rows.into_iter().find(|row| row.date == date))
    }

    /// Insert or overwrite the record for a date
    pub fn save(&self, date: &str, hours: f64) -> Result<(), StoreError> {
        let mut rows = self.sheet.read_all()?;
        match rows.iter_mut().find(|row| row.date == date) {
            Some(row) => row.hours = hours,
            None => rows.push(StudyRecordRow {
                date: date.to_string(),
                hours,
            }),
        }
        self.sheet.write_all(&rows)
    }

    /// Records within [start, end], oldest first
    pub fn range(&self, start: &str, end: &str) -> Result<Vec<StudyRecordRow>, StoreError> {
        let (Some(start), Some(end)) = (parse_date(start), parse_date(end)) else {
            return Ok(Vec::new());
        };
        let rows = self.sheet.read_all()?;
        let mut selected: Vec<StudyRecordRow> = rows
            .into_iter()
            .filter(|row| {
                parse_date(&row.date).is_some_and(|date| date >= start && date <= end)
            })
            .collect();
        selected.sort_by(|a, b| parse_date(&a.date).cmp(&parse_date(&b.date)));
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_save_is_an_upsert() {
        let (_dir, store) = store();
        store.save("2025-09-01", 4.5).unwrap();
        store.save("2025-09-01", 6.25).unwrap();

        let record = store.get("2025-09-01").unwrap().unwrap();
        assert_eq!(record.hours, 6.25);

        // Only one row exists for the date
        let all = store.range("2025-01-01", "2025-12-31").unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_range_is_inclusive_and_sorted() {
        let (_dir, store) = store();
        store.save("2025-09-03", 2.0).unwrap();
        store.save("2025-09-01", 5.0).unwrap();
        store.save("2025-09-10", 1.0).unwrap();

        let rows = store.range("2025-09-01", "2025-09-03").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2025-09-01");
        assert_eq!(rows[1].date, "2025-09-03");
    }

    #[test]
    fn test_missing_date_yields_none() {
        let (_dir, store) = store();
        assert!(store.get("2025-09-01").unwrap().is_none());
    }
}
