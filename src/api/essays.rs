//! Essay workflow endpoints

use super::{ApiError, AppState, api_error, internal_error};
use crate::core::constants::essay;
use crate::models::essays::{AnalyzeRequest, AnalyzeResponse, OcrResponse, SaveAnalysisRequest};
use crate::report;
use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::Local;
use serde_json::{Value, json};
use std::path::Path as FsPath;
use tracing::{info, warn};

/// GET /essays/topics - available years and categories
pub async fn topics(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let years = state.topics.all_years().map_err(internal_error)?;
    Ok(Json(json!({
        "years": years,
        "essay_types": state.topics.essay_types(),
    })))
}

fn category_short(essay_type: &str) -> &'static str {
    if essay_type == essay::SMALL { "small" } else { "large" }
}

/// POST /essays/topics - add or replace a topic (multipart)
///
/// Fields: `year`, `essay_type`, `topic_image` (file), `reference`.
pub async fn add_topic(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut year: Option<i32> = None;
    let mut essay_type = String::new();
    let mut reference = String::new();
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("无效的请求: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "year" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
                year = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "无效的年份"))?,
                );
            }
            "essay_type" => {
                essay_type = field
                    .text()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
            }
            "reference" => {
                reference = field
                    .text()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
            }
            "topic_image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
                image = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let year = year.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "缺少年份"))?;
    let image = image.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "缺少题目图片"))?;

    let filename = format!(
        "topic_{}_{}_{}.jpg",
        year,
        category_short(&essay_type),
        Local::now().format("%Y%m%d%H%M%S")
    );
    let file_path = state.dirs.topics.join(&filename);
    std::fs::write(&file_path, &image).map_err(internal_error)?;
    let relative_path = format!("data/topics/{filename}");

    // Replacing an existing (year, category) topic removes its old image
    match state
        .topics
        .get(year, &essay_type)
        .map_err(internal_error)?
    {
        Some(existing) => {
            let old_image = state.dirs.resolve_stored_path(&existing.image_path);
            if old_image.is_file() {
                if let Err(e) = std::fs::remove_file(&old_image) {
                    warn!("Failed to remove old topic image: {}", e);
                }
            }
            state
                .topics
                .update(year, &essay_type, Some(&relative_path), Some(&reference))
                .map_err(internal_error)?;
        }
        None => {
            state
                .topics
                .add(year, &essay_type, &relative_path, &reference)
                .map_err(internal_error)?;
        }
    }

    Ok(Json(json!({
        "message": "题目添加成功",
        "image_path": relative_path,
    })))
}

/// GET /essays/topics/{year}/{essay_type}
pub async fn topic_detail(
    State(state): State<AppState>,
    Path((year, essay_type)): Path<(i32, String)>,
) -> Result<Json<Value>, ApiError> {
    let topic = state
        .topics
        .get(year, &essay_type)
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "未找到题目"))?;
    Ok(Json(serde_json::to_value(topic).map_err(internal_error)?))
}

fn content_type_for(path: &FsPath) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// GET /essays/topics/image/{year}/{essay_type} - the topic image itself
pub async fn topic_image(
    State(state): State<AppState>,
    Path((year, essay_type)): Path<(i32, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let topic = state
        .topics
        .get(year, &essay_type)
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "未找到题目"))?;

    let image_path = state.dirs.resolve_stored_path(&topic.image_path);
    if !image_path.is_file() {
        return Err(api_error(StatusCode::NOT_FOUND, "题目图片不存在"));
    }
    let bytes = std::fs::read(&image_path).map_err(internal_error)?;
    Ok((
        [(header::CONTENT_TYPE, content_type_for(&image_path))],
        bytes,
    ))
}

/// DELETE /essays/topics/{year}/{essay_type}
pub async fn delete_topic(
    State(state): State<AppState>,
    Path((year, essay_type)): Path<(i32, String)>,
) -> Result<Json<Value>, ApiError> {
    if let Some(topic) = state
        .topics
        .get(year, &essay_type)
        .map_err(internal_error)?
    {
        let image_path = state.dirs.resolve_stored_path(&topic.image_path);
        if image_path.is_file() {
            if let Err(e) = std::fs::remove_file(&image_path) {
                warn!("Failed to remove topic image: {}", e);
            }
        }
    }
    state
        .topics
        .delete(year, &essay_type)
        .map_err(internal_error)?;
    Ok(Json(json!({ "message": "题目删除成功" })))
}

/// POST /essays/ocr - transcribe a handwritten essay photo (multipart)
///
/// Fields: `year`, `essay_type`, `image` (file). Returns the transcription
/// plus the topic context needed for the analyze step.
pub async fn ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, ApiError> {
    let mut year: Option<i32> = None;
    let mut essay_type = String::new();
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("无效的请求: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "year" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
                year = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "无效的年份"))?,
                );
            }
            "essay_type" => {
                essay_type = field
                    .text()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
            }
            "image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
                image = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let year = year.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "缺少年份"))?;
    let image = image.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "缺少作文图片"))?;

    let topic = state
        .topics
        .get(year, &essay_type)
        .map_err(internal_error)?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                format!("未找到{year}年{essay_type}的作文题目"),
            )
        })?;

    let filename = format!(
        "essay_{}_{}_{}.jpg",
        year,
        category_short(&essay_type),
        Local::now().format("%Y%m%d%H%M%S")
    );
    let image_path = state
        .images
        .save_upload(&image, &filename)
        .map_err(internal_error)?;
    if !state.images.validate_image(&image_path) {
        state.images.cleanup(&image_path);
        return Err(api_error(StatusCode::BAD_REQUEST, "无效的图片文件"));
    }

    info!("Transcribing essay photo for {}年{}", year, essay_type);
    let original_text = state.gateway.transcribe(&image_path, None).await;

    Ok(Json(OcrResponse {
        original_text,
        essay_image_path: image_path.to_string_lossy().into_owned(),
        topic: format!("{year}年{essay_type}"),
        topic_image_path: topic.image_path,
        reference_essay: topic.reference,
    }))
}

/// POST /essays/analyze-images - optimize straight from the essay photo
///
/// One-shot alternative to the OCR + analyze flow: the model reads the
/// handwriting itself. Fields: `year`, `essay_type`, `image` (file).
pub async fn analyze_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut year: Option<i32> = None;
    let mut essay_type = String::new();
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("无效的请求: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "year" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
                year = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "无效的年份"))?,
                );
            }
            "essay_type" => {
                essay_type = field
                    .text()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
            }
            "image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
                image = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let year = year.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "缺少年份"))?;
    let image = image.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "缺少作文图片"))?;

    let topic = state
        .topics
        .get(year, &essay_type)
        .map_err(internal_error)?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                format!("未找到{year}年{essay_type}的作文题目"),
            )
        })?;

    let filename = format!(
        "essay_{}_{}_{}.jpg",
        year,
        category_short(&essay_type),
        Local::now().format("%Y%m%d%H%M%S")
    );
    let essay_image = state
        .images
        .save_upload(&image, &filename)
        .map_err(internal_error)?;
    if !state.images.validate_image(&essay_image) {
        state.images.cleanup(&essay_image);
        return Err(api_error(StatusCode::BAD_REQUEST, "无效的图片文件"));
    }

    let topic_image = state.dirs.resolve_stored_path(&topic.image_path);
    let result = state
        .gateway
        .optimize_with_images(&topic_image, &essay_image, &topic.reference, &essay_type)
        .await;

    Ok(Json(AnalyzeResponse {
        topic: format!("{year}年{essay_type}"),
        topic_image_path: Some(topic.image_path),
        reference_essay: topic.reference,
        original_text: result.original_text,
        score: result.score,
        optimized_text: result.optimized_text,
        suggestions: result.suggestions,
    }))
}

/// POST /essays/analyze - optimize the transcribed essay
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    if request.original_text.is_empty() || request.reference_essay.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "缺少必需参数"));
    }

    let topic_image = request
        .topic_image_path
        .as_deref()
        .filter(|path| !path.is_empty())
        .map(|path| state.dirs.resolve_stored_path(path));

    let result = state
        .gateway
        .optimize(
            topic_image.as_deref(),
            &request.reference_essay,
            &request.original_text,
            &request.essay_type,
        )
        .await;

    // Advisory semantic validation; the result is returned either way
    let payload = serde_json::to_value(&result).map_err(internal_error)?;
    if !state.gateway.validate_structure(&payload).await {
        warn!("Optimization result failed semantic validation, returning it anyway");
    }

    Ok(Json(AnalyzeResponse {
        topic: format!("{}年{}", request.year, request.essay_type),
        topic_image_path: request.topic_image_path,
        reference_essay: request.reference_essay,
        original_text: result.original_text,
        score: result.score,
        optimized_text: result.optimized_text,
        suggestions: result.suggestions,
    }))
}

/// POST /essays/save - write the analysis report to disk
pub async fn save_analysis(
    State(state): State<AppState>,
    Json(request): Json<SaveAnalysisRequest>,
) -> Result<Json<Value>, ApiError> {
    let file_path = report::save_essay_analysis(&state.dirs.essays_output, request.year, &request.data)
        .map_err(internal_error)?;
    Ok(Json(json!({
        "message": "分析报告已保存",
        "file_path": file_path.to_string_lossy(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_short() {
        assert_eq!(category_short("小作文"), "small");
        assert_eq!(category_short("大作文"), "large");
        assert_eq!(category_short("随便"), "large");
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for(FsPath::new("a.png")), "image/png");
        assert_eq!(content_type_for(FsPath::new("a.JPG")), "image/jpeg");
        assert_eq!(content_type_for(FsPath::new("a")), "image/jpeg");
    }
}
