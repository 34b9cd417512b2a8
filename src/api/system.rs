//! System configuration endpoints

use super::{ApiError, AppState, api_error, internal_error};
use crate::core::config::Credentials;
use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ApiKeysRequest {
    pub modelscope_api_key: String,
    pub dashscope_api_key: String,
}

/// GET /system/status
pub async fn status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(json!({
        "api_configured": state.credentials.exists(),
        "daily_tasks_exists": state.tasks.file_path().exists(),
    })))
}

/// POST /system/api-keys - persist keys and swap in a fresh snapshot
pub async fn save_api_keys(
    State(state): State<AppState>,
    Json(request): Json<ApiKeysRequest>,
) -> Result<Json<Value>, ApiError> {
    let credentials = Credentials::new(request.modelscope_api_key, request.dashscope_api_key);
    state.credentials.save(&credentials).map_err(internal_error)?;
    state.gateway.reload_credentials(credentials).await;
    info!("API credentials updated and reloaded");
    Ok(Json(json!({ "success": true, "message": "API密钥保存成功" })))
}

/// POST /system/upload-daily-tasks - import a task table (multipart)
///
/// Rejected when a task table already exists, so an import cannot clobber
/// live data.
pub async fn upload_daily_tasks(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let tasks_file = state.tasks.file_path();
    let has_rows = std::fs::metadata(tasks_file)
        .map(|meta| meta.len() > 0)
        .unwrap_or(false);
    if has_rows {
        return Err(api_error(StatusCode::BAD_REQUEST, "任务表已存在"));
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("无效的请求: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.ends_with(".csv") {
            return Err(api_error(StatusCode::BAD_REQUEST, "只能上传 .csv 格式的文件"));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
        std::fs::write(tasks_file, &data).map_err(internal_error)?;
        return Ok(Json(json!({ "success": true, "message": "任务表上传成功" })));
    }

    Err(api_error(StatusCode::BAD_REQUEST, "缺少文件"))
}

/// DELETE /system/cleanup-temp - wipe and recreate the temp directory
pub async fn cleanup_temp(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let temp_dir = &state.dirs.temp;
    if temp_dir.exists() {
        std::fs::remove_dir_all(temp_dir).map_err(internal_error)?;
    }
    std::fs::create_dir_all(temp_dir).map_err(internal_error)?;
    Ok(Json(json!({ "success": true, "message": "临时文件清理成功" })))
}
