//! Daily task store
//!
//! Tasks belong to a calendar date; IDs increment globally across dates so a
//! task can be addressed without its date.

use super::{Sheet, StoreError};
use crate::core::constants::DEFAULT_DAILY_TASKS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One task row as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: u64,
    /// Date, YYYY-MM-DD
    pub date: String,
    pub task_name: String,
    pub completed: bool,
}

pub struct TaskStore {
    sheet: Sheet<TaskRow>,
}

impl TaskStore {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            sheet: Sheet::open(data_dir.join("daily_tasks.csv"))?,
        })
    }

    /// File backing this store (used by the system status endpoint)
    pub fn file_path(&self) -> &Path {
        self.sheet.path()
    }

    fn next_id(rows: &[TaskRow]) -> u64 {
        rows.iter().map(|row| row.id).max().unwrap_or(0) + 1
    }

    pub fn by_date(&self, date: &str) -> Result<Vec<TaskRow>, StoreError> {
        let rows = self.sheet.read_all()?;
        Ok(rows.into_iter().filter(|row| row.date == date).collect())
    }

    pub fn add(&self, date: &str, task_name: &str, completed: bool) -> Result<u64, StoreError> {
        let rows = self.sheet.read_all()?;
        let id = Self::next_id(&rows);
        self.sheet.append(TaskRow {
            id,
            date: date.to_string(),
            task_name: task_name.to_string(),
            completed,
        })?;
        Ok(id)
    }

    /// Delete the task with the given ID; false when absent
    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let rows = self.sheet.read_all()?;
        let before = rows.len();
        let remaining: Vec<TaskRow> = rows.into_iter().filter(|row| row.id != id).collect();
        let removed = remaining.len() < before;
        if removed {
            self.sheet.write_all(&remaining)?;
        }
        Ok(removed)
    }

    /// Reconcile completion for one date: every task of the date is reset,
    /// then the listed IDs are marked completed.
    pub fn set_completed_for_date(
        &self,
        date: &str,
        completed_ids: &[u64],
    ) -> Result<(), StoreError> {
        let mut rows = self.sheet.read_all()?;
        for row in rows.iter_mut().filter(|row| row.date == date) {
            row.completed = completed_ids.contains(&row.id);
        }
        self.sheet.write_all(&rows)
    }

    /// Seed the default task list for a date that has no tasks yet
    pub fn init_defaults_for_date(&self, date: &str) -> Result<(), StoreError> {
        if self.by_date(date)?.is_empty() {
            for task_name in DEFAULT_DAILY_TASKS {
                self.add(date, task_name, false)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, TaskStore) {
        let dir = tempdir().unwrap();
        let store = TaskStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_ids_are_global_across_dates() {
        let (_dir, store) = store();
        let a = store.add("2025-09-01", "数学练习", false).unwrap();
        let b = store.add("2025-09-02", "英语阅读", false).unwrap();
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn test_init_defaults_only_when_date_is_empty() {
        let (_dir, store) = store();
        store.init_defaults_for_date("2025-09-01").unwrap();
        assert_eq!(
            store.by_date("2025-09-01").unwrap().len(),
            DEFAULT_DAILY_TASKS.len()
        );

        // A second init must not duplicate
        store.init_defaults_for_date("2025-09-01").unwrap();
        assert_eq!(
            store.by_date("2025-09-01").unwrap().len(),
            DEFAULT_DAILY_TASKS.len()
        );

        // A date with any task is left alone
        store.add("2025-09-02", "错题整理", false).unwrap();
        store.init_defaults_for_date("2025-09-02").unwrap();
        assert_eq!(store.by_date("2025-09-02").unwrap().len(), 1);
    }

    #[test]
    fn test_reconciliation_resets_then_sets() {
        let (_dir, store) = store();
        let a = store.add("2025-09-01", "数学练习", true).unwrap();
        let b = store.add("2025-09-01", "英语阅读", false).unwrap();
        let other = store.add("2025-09-02", "专业课复习", true).unwrap();

        store.set_completed_for_date("2025-09-01", &[b]).unwrap();

        let tasks = store.by_date("2025-09-01").unwrap();
        let completed: Vec<u64> = tasks
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.id)
            .collect();
        assert_eq!(completed, vec![b]);
        assert!(!tasks.iter().find(|t| t.id == a).unwrap().completed);

        // Other dates are untouched
        let other_tasks = store.by_date("2025-09-02").unwrap();
        assert!(other_tasks.iter().find(|t| t.id == other).unwrap().completed);
    }

    #[test]
    fn test_delete_task() {
        let (_dir, store) = store();
        let id = store.add("2025-09-01", "数学练习", false).unwrap();
        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(store.by_date("2025-09-01").unwrap().is_empty());
    }
}
