//! Score endpoints

use super::{ApiError, AppState, api_error, internal_error};
use crate::core::constants::subject;
use crate::models::scores::{
    PaperTypeQuery, ScoreChartQuery, ScoreCreate, ScoreEntry, ScoreListResponse, ScoreQuery,
    ScoreUpdate,
};
use crate::store::scores::ScoreRow;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

/// GET /paper-types - paper types for one subject
pub async fn paper_types(Query(query): Query<PaperTypeQuery>) -> Result<Json<Value>, ApiError> {
    match subject::paper_types(&query.subject) {
        Some(types) => Ok(Json(json!({ "paper_types": types }))),
        None => Err(api_error(StatusCode::BAD_REQUEST, "无效的科目")),
    }
}

/// Validate a new score record against subject rules
fn validate_score(score: &ScoreCreate) -> Result<(), String> {
    let Some(types) = subject::paper_types(&score.subject) else {
        return Err(format!("无效的科目 '{}'", score.subject));
    };
    if !types.contains(&score.paper_type.as_str()) {
        return Err(format!(
            "试卷类型 '{}' 不适用于科目 '{}'",
            score.paper_type, score.subject
        ));
    }
    if !(2000..=2100).contains(&score.year) {
        return Err("年份必须在2000-2100之间".to_string());
    }
    let max = if score.subject == subject::ENGLISH {
        100.0
    } else {
        150.0
    };
    if score.score < 0.0 || score.score > max {
        return Err(format!("{}分数必须在0-{}之间", score.subject, max as u32));
    }
    Ok(())
}

/// POST /scores - add a record
pub async fn create(
    State(state): State<AppState>,
    Json(score): Json<ScoreCreate>,
) -> Result<Json<Value>, ApiError> {
    validate_score(&score).map_err(|detail| api_error(StatusCode::BAD_REQUEST, detail))?;

    let id = state
        .scores
        .add(
            &score.subject,
            score.year,
            &score.paper_type,
            score.score,
            &score.input_date,
        )
        .map_err(internal_error)?;

    Ok(Json(json!({ "message": "分数记录添加成功", "id": id })))
}

fn to_entry(row: ScoreRow) -> ScoreEntry {
    ScoreEntry {
        id: row.id,
        subject: row.subject,
        year: row.year,
        paper_type: row.paper_type,
        score: row.score,
        input_date: row.input_date,
    }
}

/// GET /scores - filtered, paginated listing
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ScoreQuery>,
) -> Result<Json<ScoreListResponse>, ApiError> {
    let page_size = query.page_size.clamp(1, 100);
    let (rows, total) = state
        .scores
        .list(
            query.subject.as_deref(),
            query.paper_type.as_deref(),
            query.page,
            page_size,
        )
        .map_err(internal_error)?;

    Ok(Json(ScoreListResponse {
        total,
        page: query.page.max(1),
        page_size,
        data: rows.into_iter().map(to_entry).collect(),
    }))
}

/// PUT /scores/{id} - partial update
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<ScoreUpdate>,
) -> Result<Json<Value>, ApiError> {
    let found = state.scores.update(id, &patch).map_err(internal_error)?;
    if !found {
        return Err(api_error(StatusCode::NOT_FOUND, "分数记录不存在"));
    }
    Ok(Json(json!({ "message": "分数记录更新成功" })))
}

/// DELETE /scores/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let found = state.scores.delete(id).map_err(internal_error)?;
    if !found {
        return Err(api_error(StatusCode::NOT_FOUND, "分数记录不存在"));
    }
    Ok(Json(json!({ "message": "分数记录删除成功" })))
}

/// GET /scores/chart-data - series for the score chart
pub async fn chart_data(
    State(state): State<AppState>,
    Query(query): Query<ScoreChartQuery>,
) -> Result<Json<Value>, ApiError> {
    let rows = state
        .scores
        .chart_data(&query.subject, query.paper_type.as_deref())
        .map_err(internal_error)?;

    if rows.is_empty() {
        return Ok(Json(json!({
            "message": "未查询到相关数据",
            "dates": [],
            "scores": [],
            "subject": query.subject,
        })));
    }

    let dates: Vec<&str> = rows.iter().map(|row| row.input_date.as_str()).collect();
    let scores: Vec<f64> = rows.iter().map(|row| row.score).collect();
    Ok(Json(json!({
        "dates": dates,
        "scores": scores,
        "subject": query.subject,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(subject: &str, paper_type: &str, year: i32, value: f64) -> ScoreCreate {
        ScoreCreate {
            subject: subject.to_string(),
            year,
            paper_type: paper_type.to_string(),
            score: value,
            input_date: "2025-09-01".to_string(),
        }
    }

    #[test]
    fn test_validate_score_accepts_valid_records() {
        assert!(validate_score(&score("数学", "真题", 2024, 132.0)).is_ok());
        assert!(validate_score(&score("英语", "其他", 2024, 88.5)).is_ok());
    }

    #[test]
    fn test_validate_score_rejects_wrong_paper_type() {
        assert!(validate_score(&score("英语", "张宇四套卷", 2024, 70.0)).is_err());
        assert!(validate_score(&score("物理", "真题", 2024, 70.0)).is_err());
    }

    #[test]
    fn test_validate_score_enforces_subject_ranges() {
        assert!(validate_score(&score("英语", "真题", 2024, 120.0)).is_err());
        assert!(validate_score(&score("数学", "真题", 2024, 151.0)).is_err());
        assert!(validate_score(&score("数学", "真题", 2024, -1.0)).is_err());
        assert!(validate_score(&score("数学", "真题", 1999, 100.0)).is_err());
    }
}
