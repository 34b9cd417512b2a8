//! Exam score store

use super::{Sheet, StoreError, parse_date};
use crate::models::scores::ScoreUpdate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One score row as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub id: u64,
    pub subject: String,
    pub year: i32,
    pub paper_type: String,
    pub score: f64,
    /// Entry date, YYYY-MM-DD
    pub input_date: String,
}

pub struct ScoreStore {
    sheet: Sheet<ScoreRow>,
}

impl ScoreStore {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            sheet: Sheet::open(data_dir.join("scores.csv"))?,
        })
    }

    fn next_id(rows: &[ScoreRow]) -> u64 {
        rows.iter().map(|row| row.id).max().unwrap_or(0) + 1
    }

    /// Add a score record, returning its new ID
    pub fn add(
        &self,
        subject: &str,
        year: i32,
        paper_type: &str,
        score: f64,
        input_date: &str,
    ) -> Result<u64, StoreError> {
        let rows = self.sheet.read_all()?;
        let id = Self::next_id(&rows);
        self.sheet.append(ScoreRow {
            id,
            subject: subject.to_string(),
            year,
            paper_type: paper_type.to_string(),
            score,
            input_date: input_date.to_string(),
        })?;
        Ok(id)
    }

    /// Filtered, newest-first page of records plus the filtered total
    pub fn list(
        &self,
        subject: Option<&str>,
        paper_type: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<(Vec<ScoreRow>, usize), StoreError> {
        let mut rows = self.filtered(subject, paper_type)?;
        rows.sort_by(|a, b| parse_date(&b.input_date).cmp(&parse_date(&a.input_date)));

        let total = rows.len();
        let page = page.max(1);
        let start = (page - 1) * page_size;
        let page_rows = rows.into_iter().skip(start).take(page_size).collect();
        Ok((page_rows, total))
    }

    /// Oldest-first records for charting
    pub fn chart_data(
        &self,
        subject: &str,
        paper_type: Option<&str>,
    ) -> Result<Vec<ScoreRow>, StoreError> {
        let mut rows = self.filtered(Some(subject), paper_type)?;
        rows.sort_by(|a, b| parse_date(&a.input_date).cmp(&parse_date(&b.input_date)));
        Ok(rows)
    }

    fn filtered(
        &self,
        subject: Option<&str>,
        paper_type: Option<&str>,
    ) -> Result<Vec<ScoreRow>, StoreError> {
        let rows = self.sheet.read_all()?;
        Ok(rows
            .into_iter()
            .filter(|row| subject.is_none_or(|s| row.subject == s))
            .filter(|row| paper_type.is_none_or(|p| row.paper_type == p))
            .collect())
    }

    /// Apply a partial update to the record with the given ID
    ///
    /// Returns false when no record matches.
    pub fn update(&self, id: u64, patch: &ScoreUpdate) -> Result<bool, StoreError> {
        let mut rows = self.sheet.read_all()?;
        let Some(row) = rows.iter_mut().find(|row| row.id == id) else {
            return Ok(false);
        };
        if let Some(subject) = &patch.subject {
            row.subject = subject.clone();
        }
        if let Some(year) = patch.year {
            row.year = year;
        }
        if let Some(paper_type) = &patch.paper_type {
            row.paper_type = paper_type.clone();
        }
        if let Some(score) = patch.score {
            row.score = score;
        }
        if let Some(input_date) = &patch.input_date {
            row.input_date = input_date.clone();
        }
        self.sheet.write_all(&rows)?;
        Ok(true)
    }

    /// Delete the record with the given ID; false when absent
    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let rows = self.sheet.read_all()?;
        let before = rows.len();
        let remaining: Vec<ScoreRow> = rows.into_iter().filter(|row| row.id != id).collect();
        let removed = remaining.len() < before;
        if removed {
            self.sheet.write_all(&remaining)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, ScoreStore) {
        let dir = tempdir().unwrap();
        let store = ScoreStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_ids_increment_from_one() {
        let (_dir, store) = store();
        assert_eq!(store.add("数学", 2024, "真题", 121.0, "2025-09-01").unwrap(), 1);
        assert_eq!(store.add("英语", 2024, "真题", 72.5, "2025-09-02").unwrap(), 2);
    }

    #[test]
    fn test_list_filters_sorts_and_paginates() {
        let (_dir, store) = store();
        store.add("数学", 2022, "真题", 110.0, "2025-09-01").unwrap();
        store.add("数学", 2023, "真题", 118.0, "2025-09-03").unwrap();
        store.add("英语", 2023, "真题", 70.0, "2025-09-02").unwrap();
        store.add("数学", 2024, "模拟题", 95.0, "2025-09-04").unwrap();

        let (rows, total) = store.list(Some("数学"), Some("真题"), 1, 10).unwrap();
        assert_eq!(total, 2);
        // Newest first
        assert_eq!(rows[0].year, 2023);
        assert_eq!(rows[1].year, 2022);

        let (page2, total) = store.list(None, None, 2, 3).unwrap();
        assert_eq!(total, 4);
        assert_eq!(page2.len(), 1);
    }

    #[test]
    fn test_update_patches_only_given_fields() {
        let (_dir, store) = store();
        let id = store.add("数学", 2024, "真题", 100.0, "2025-09-01").unwrap();

        let patch = ScoreUpdate {
            score: Some(125.0),
            ..Default::default()
        };
        assert!(store.update(id, &patch).unwrap());

        let (rows, _) = store.list(None, None, 1, 10).unwrap();
        assert_eq!(rows[0].score, 125.0);
        assert_eq!(rows[0].subject, "数学");

        assert!(!store.update(999, &patch).unwrap());
    }

    #[test]
    fn test_delete_by_id() {
        let (_dir, store) = store();
        let id = store.add("英语", 2024, "真题", 65.0, "2025-09-01").unwrap();
        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        let (_, total) = store.list(None, None, 1, 10).unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_chart_data_is_oldest_first() {
        let (_dir, store) = store();
        store.add("数学", 2024, "真题", 120.0, "2025-09-03").unwrap();
        store.add("数学", 2024, "真题", 105.0, "2025-09-01").unwrap();

        let rows = store.chart_data("数学", Some("真题")).unwrap();
        assert_eq!(rows[0].score, 105.0);
        assert_eq!(rows[1].score, 120.0);
    }
}
