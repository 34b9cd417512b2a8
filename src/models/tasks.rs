//! Daily task and study record data models

use serde::{Deserialize, Serialize};

/// One task on a given date
#[derive(Debug, Clone, Serialize)]
pub struct DailyTask {
    pub id: u64,
    pub date: String,
    pub task_name: String,
    pub completed: bool,
}

/// Request body for POST /tasks/add
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreate {
    pub date: String,
    pub task_name: String,
}

/// Request body for POST /tasks/save and PUT /tasks/record
///
/// Hours and minutes are combined into fractional hours server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyRecordSave {
    pub date: String,
    pub study_hours: u32,
    pub study_minutes: u32,
    pub completed_task_ids: Vec<u64>,
}

impl StudyRecordSave {
    /// Total study time as fractional hours
    pub fn total_hours(&self) -> f64 {
        f64::from(self.study_hours) + f64::from(self.study_minutes) / 60.0
    }
}

/// Response body for GET /tasks/by-date
#[derive(Debug, Clone, Serialize)]
pub struct DailyTasksResponse {
    pub date: String,
    pub study_hours: f64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: f64,
    pub tasks: Vec<DailyTask>,
}

/// One point of the study-time chart
#[derive(Debug, Clone, Serialize)]
pub struct TaskChartPoint {
    pub date: String,
    pub study_hours: f64,
    pub completion_rate: f64,
}

/// Query parameters for GET /tasks/by-date
#[derive(Debug, Clone, Deserialize)]
pub struct ByDateQuery {
    /// Date, YYYY-MM-DD
    pub date: String,
}

/// Query parameters for GET /tasks/chart-data
#[derive(Debug, Clone, Deserialize)]
pub struct TaskChartQuery {
    #[serde(default = "default_view")]
    pub view: String,
}

fn default_view() -> String {
    "week".to_string()
}
