//! Daily task and study record endpoints

use super::{ApiError, AppState, api_error, internal_error};
use crate::models::tasks::{
    ByDateQuery, DailyTask, DailyTasksResponse, StudyRecordSave, TaskChartPoint, TaskChartQuery,
    TaskCreate,
};
use crate::store::tasks::TaskRow;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{Duration, Local, NaiveDate};
use serde_json::{Value, json};

fn completion_rate(completed: usize, total: usize) -> f64 {
    if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

fn to_daily_task(row: TaskRow) -> DailyTask {
    DailyTask {
        id: row.id,
        date: row.date,
        task_name: row.task_name,
        completed: row.completed,
    }
}

/// GET /tasks/by-date - tasks and study record of one date
///
/// A date seen for the first time is seeded with the default task list.
pub async fn by_date(
    State(state): State<AppState>,
    Query(query): Query<ByDateQuery>,
) -> Result<Json<DailyTasksResponse>, ApiError> {
    state
        .tasks
        .init_defaults_for_date(&query.date)
        .map_err(internal_error)?;

    let rows = state.tasks.by_date(&query.date).map_err(internal_error)?;
    let record = state.records.get(&query.date).map_err(internal_error)?;
    let study_hours = record.map(|r| r.hours).unwrap_or(0.0);

    let total_tasks = rows.len();
    let completed_tasks = rows.iter().filter(|row| row.completed).count();

    Ok(Json(DailyTasksResponse {
        date: query.date,
        study_hours,
        total_tasks,
        completed_tasks,
        completion_rate: completion_rate(completed_tasks, total_tasks),
        tasks: rows.into_iter().map(to_daily_task).collect(),
    }))
}

/// POST /tasks/add
pub async fn add(
    State(state): State<AppState>,
    Json(task): Json<TaskCreate>,
) -> Result<Json<Value>, ApiError> {
    let task_id = state
        .tasks
        .add(&task.date, &task.task_name, false)
        .map_err(internal_error)?;
    Ok(Json(json!({ "message": "任务添加成功", "task_id": task_id })))
}

/// DELETE /tasks/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let found = state.tasks.delete(id).map_err(internal_error)?;
    if !found {
        return Err(api_error(StatusCode::NOT_FOUND, "任务不存在"));
    }
    Ok(Json(json!({ "message": "任务删除成功" })))
}

/// Shared body of POST /tasks/save and PUT /tasks/record
async fn store_record(state: &AppState, record: &StudyRecordSave) -> Result<Json<Value>, ApiError> {
    let total_hours = record.total_hours();

    state
        .tasks
        .set_completed_for_date(&record.date, &record.completed_task_ids)
        .map_err(internal_error)?;
    state
        .records
        .save(&record.date, total_hours)
        .map_err(internal_error)?;

    let total_tasks = state.tasks.by_date(&record.date).map_err(internal_error)?.len();
    Ok(Json(json!({
        "message": "学习记录保存成功",
        "study_hours": total_hours,
        "completion_rate": completion_rate(record.completed_task_ids.len(), total_tasks),
    })))
}

/// POST /tasks/save - save study time and task completion for a date
pub async fn save(
    State(state): State<AppState>,
    Json(record): Json<StudyRecordSave>,
) -> Result<Json<Value>, ApiError> {
    store_record(&state, &record).await
}

/// PUT /tasks/record - update an existing study record
pub async fn update_record(
    State(state): State<AppState>,
    Json(record): Json<StudyRecordSave>,
) -> Result<Json<Value>, ApiError> {
    let existing = state.records.get(&record.date).map_err(internal_error)?;
    if existing.is_none() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("{} 没有学习记录", record.date),
        ));
    }
    store_record(&state, &record).await
}

/// GET /tasks/chart-data - study hours and completion per day
///
/// view: week (last 7 days) | month (last 30 days) | all
pub async fn chart_data(
    State(state): State<AppState>,
    Query(query): Query<TaskChartQuery>,
) -> Result<Json<Value>, ApiError> {
    let today = Local::now().date_naive();
    let start = match query.view.as_str() {
        "week" => today - Duration::days(6),
        "month" => today - Duration::days(29),
        "all" => NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date"),
        other => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("无效的视图 '{other}'"),
            ));
        }
    };

    let records = state
        .records
        .range(
            &start.format("%Y-%m-%d").to_string(),
            &today.format("%Y-%m-%d").to_string(),
        )
        .map_err(internal_error)?;

    let mut data = Vec::with_capacity(records.len());
    for record in records {
        let tasks = state.tasks.by_date(&record.date).map_err(internal_error)?;
        let completed = tasks.iter().filter(|task| task.completed).count();
        data.push(TaskChartPoint {
            date: record.date,
            study_hours: record.hours,
            completion_rate: completion_rate(completed, tasks.len()),
        });
    }

    Ok(Json(json!({ "data": data })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(1, 4), 25.0);
        assert_eq!(completion_rate(4, 4), 100.0);
    }

    #[test]
    fn test_total_hours_combines_minutes() {
        let record = StudyRecordSave {
            date: "2025-09-01".to_string(),
            study_hours: 3,
            study_minutes: 45,
            completed_task_ids: vec![],
        };
        assert_eq!(record.total_hours(), 3.75);
    }
}
