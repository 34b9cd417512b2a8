//! Essay topic store
//!
//! Topics are keyed by (year, essay category); the topic itself is an image
//! on disk referenced by path, alongside a reference essay text.

use super::{Sheet, StoreError};
use crate::core::constants::essay;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One topic row as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRow {
    pub year: i32,
    pub essay_type: String,
    /// Path of the topic image, relative to the data root
    pub image_path: String,
    /// Reference essay text
    pub reference: String,
}

pub struct TopicStore {
    sheet: Sheet<TopicRow>,
}

impl TopicStore {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            sheet: Sheet::open(data_dir.join("essays.csv"))?,
        })
    }

    pub fn add(
        &self,
        year: i32,
        essay_type: &str,
        image_path: &str,
        reference: &str,
    ) -> Result<(), StoreError> {
        self.sheet.append(TopicRow {
            year,
            essay_type: essay_type.to_string(),
            image_path: image_path.to_string(),
            reference: reference.to_string(),
        })
    }

    /// Update image path and/or reference of an existing topic
    pub fn update(
        &self,
        year: i32,
        essay_type: &str,
        image_path: Option<&str>,
        reference: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut rows = self.sheet.read_all()?;
        for row in rows
            .iter_mut()
            .filter(|row| row.year == year && row.essay_type == essay_type)
        {
            if let Some(path) = image_path {
                row.image_path = path.to_string();
            }
            if let Some(text) = reference {
                row.reference = text.to_string();
            }
        }
        self.sheet.write_all(&rows)
    }

    pub fn delete(&self, year: i32, essay_type: &str) -> Result<(), StoreError> {
        let rows = self.sheet.read_all()?;
        let remaining: Vec<TopicRow> = rows
            .into_iter()
            .filter(|row| !(row.year == year && row.essay_type == essay_type))
            .collect();
        self.sheet.write_all(&remaining)
    }

    pub fn get(&self, year: i32, essay_type: &str) -> Result<Option<TopicRow>, StoreError> {
        let rows = self.sheet.read_all()?;
        Ok(rows
            .into_iter()
            .find(|row| row.year == year && row.essay_type == essay_type))
    }

    /// All years with at least one topic, newest first
    pub fn all_years(&self) -> Result<Vec<i32>, StoreError> {
        let rows = self.sheet.read_all()?;
        let mut years: Vec<i32> = rows.iter().map(|row| row.year).collect();
        years.sort_unstable();
        years.dedup();
        years.reverse();
        Ok(years)
    }

    /// The fixed essay categories
    pub fn essay_types(&self) -> Vec<String> {
        essay::CATEGORIES.iter().map(|s| s.to_string()).collect()
    }
}
