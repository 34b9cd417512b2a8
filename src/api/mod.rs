//! HTTP API layer
//!
//! Route definitions, shared application state and the error shape used by
//! every handler. Error bodies are `{"detail": "..."}` to match what the
//! frontend already expects.

pub mod chat;
pub mod essays;
pub mod scores;
pub mod system;
pub mod tasks;

use crate::core::config::{CredentialStore, DataDirs, Settings};
use crate::gateway::AiGateway;
use crate::images::ImageIntake;
use crate::store::{RecordStore, ScoreStore, TaskStore, TopicStore};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::error;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub dirs: Arc<DataDirs>,
    pub gateway: Arc<AiGateway>,
    pub images: Arc<ImageIntake>,
    pub scores: Arc<ScoreStore>,
    pub topics: Arc<TopicStore>,
    pub tasks: Arc<TaskStore>,
    pub records: Arc<RecordStore>,
    pub credentials: Arc<CredentialStore>,
}

/// Error response: status code plus a `{"detail": ...}` body
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(json!({ "detail": detail.into() })))
}

pub fn internal_error(e: impl std::fmt::Display) -> ApiError {
    error!("Request failed: {}", e);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/chat", post(chat::chat))
        .route("/chat/save", post(chat::save_history))
        .route("/paper-types", get(scores::paper_types))
        .route("/scores", post(scores::create).get(scores::list))
        .route("/scores/chart-data", get(scores::chart_data))
        .route("/scores/{id}", put(scores::update).delete(scores::remove))
        .route("/essays/topics", get(essays::topics).post(essays::add_topic))
        .route(
            "/essays/topics/{year}/{essay_type}",
            get(essays::topic_detail).delete(essays::delete_topic),
        )
        .route(
            "/essays/topics/image/{year}/{essay_type}",
            get(essays::topic_image),
        )
        .route("/essays/ocr", post(essays::ocr))
        .route("/essays/analyze", post(essays::analyze))
        .route("/essays/analyze-images", post(essays::analyze_images))
        .route("/essays/save", post(essays::save_analysis))
        .route("/tasks/by-date", get(tasks::by_date))
        .route("/tasks/add", post(tasks::add))
        .route("/tasks/{id}", delete(tasks::remove))
        .route("/tasks/save", post(tasks::save))
        .route("/tasks/record", put(tasks::update_record))
        .route("/tasks/chart-data", get(tasks::chart_data))
        .route("/system/status", get(system::status))
        .route("/system/api-keys", post(system::save_api_keys))
        .route("/system/upload-daily-tasks", post(system::upload_daily_tasks))
        .route("/system/cleanup-temp", delete(system::cleanup_temp));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        // The data directory is exposed so the frontend can load topic images
        .nest_service("/data", ServeDir::new(&state.dirs.data))
        // Uploads carry whole essay photos; no body size ceiling is enforced
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET / - Root endpoint
async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": "欢迎使用 Study Helper API",
        "status": "running",
        "data_root": state.dirs.root.to_string_lossy(),
        "models": {
            "vision": state.settings.models.vision_model,
            "chat": state.settings.models.chat_model,
        },
        "endpoints": {
            "chat": "/api/v1/chat",
            "scores": "/api/v1/scores",
            "essays": "/api/v1/essays/topics",
            "tasks": "/api/v1/tasks/by-date",
            "system": "/api/v1/system/status",
            "health": "/health",
        },
    }))
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let creds = state.gateway.snapshot().await;
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "modelscope_configured": creds.modelscope().is_some(),
        "dashscope_configured": creds.dashscope().is_some(),
    }))
}
