//! Chat endpoints

use super::{ApiError, AppState, api_error, internal_error};
use crate::models::chat::{ChatResponseBody, ChatTurn, SaveChatHistoryRequest};
use crate::report;
use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use chrono::Local;
use serde_json::{Value, json};
use tracing::{info, warn};

/// POST /chat - one assistant turn, multipart with optional image
///
/// Fields: `message` (text), `image` (optional file), `history` (optional
/// JSON array of prior turns).
pub async fn chat(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let mut message = String::new();
    let mut history_raw: Option<String> = None;
    let mut upload: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("无效的请求: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "message" => {
                message = field
                    .text()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
            }
            "history" => {
                history_raw = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?,
                );
            }
            "image" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}.jpg", uuid::Uuid::new_v4()));
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
                if !data.is_empty() {
                    upload = Some((data.to_vec(), filename));
                }
            }
            _ => {}
        }
    }

    let history = parse_history(history_raw.as_deref());

    let image_path = match upload {
        Some((bytes, filename)) => {
            let stamp = Local::now().format("%Y%m%d%H%M%S");
            let stored_name = format!("chat_{stamp}_{filename}");
            let path = state
                .images
                .save_upload(&bytes, &stored_name)
                .map_err(internal_error)?;
            if !state.images.validate_image(&path) {
                state.images.cleanup(&path);
                return Err(api_error(StatusCode::BAD_REQUEST, "无效的图片文件"));
            }
            Some(path)
        }
        None => None,
    };

    info!(
        "Chat turn: {} history entries, image: {}",
        history.len(),
        image_path.is_some()
    );

    let response = match &image_path {
        Some(path) => {
            state
                .gateway
                .converse_with_image(&message, Some(path), &history)
                .await
        }
        None => state.gateway.converse(&message, &history).await,
    };

    Ok(Json(ChatResponseBody { response }))
}

/// Parse the history field; malformed JSON degrades to an empty history
fn parse_history(raw: Option<&str>) -> Vec<ChatTurn> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => match serde_json::from_str(raw) {
            Ok(history) => history,
            Err(e) => {
                warn!("Discarding malformed chat history: {}", e);
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}

/// POST /chat/save - export the conversation as Markdown
pub async fn save_history(
    State(state): State<AppState>,
    Json(request): Json<SaveChatHistoryRequest>,
) -> Result<Json<Value>, ApiError> {
    let export = report::save_chat_history(&state.dirs.chat_history, &request.messages)
        .map_err(internal_error)?;
    info!(
        "Chat history saved to {} ({} image(s))",
        export.file_path.display(),
        export.images_saved
    );
    Ok(Json(json!({
        "message": "聊天记录已保存",
        "file_path": export.file_path.to_string_lossy(),
        "filename": export.filename,
        "images_saved": export.images_saved,
    })))
}
