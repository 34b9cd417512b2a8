//! Score tracking data models

use serde::{Deserialize, Serialize};

/// Request body for POST /scores
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreCreate {
    pub subject: String,
    pub year: i32,
    pub paper_type: String,
    pub score: f64,
    /// Entry date, YYYY-MM-DD
    pub input_date: String,
}

/// Partial update for PUT /scores/{id}
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreUpdate {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub paper_type: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub input_date: Option<String>,
}

/// One stored score record as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct ScoreEntry {
    pub id: u64,
    pub subject: String,
    pub year: i32,
    pub paper_type: String,
    pub score: f64,
    pub input_date: String,
}

/// Response body for GET /scores
#[derive(Debug, Clone, Serialize)]
pub struct ScoreListResponse {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub data: Vec<ScoreEntry>,
}

/// Query parameters for GET /scores
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreQuery {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub paper_type: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

/// Query parameters for GET /paper-types
#[derive(Debug, Clone, Deserialize)]
pub struct PaperTypeQuery {
    pub subject: String,
}

/// Query parameters for GET /scores/chart-data
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreChartQuery {
    pub subject: String,
    #[serde(default)]
    pub paper_type: Option<String>,
}
