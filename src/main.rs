//! Study Helper backend
//!
//! Personal study-tracking API: exam scores, daily tasks and study time,
//! and an essay-practice workflow backed by hosted multimodal models.

mod api;
mod core;
mod gateway;
mod images;
mod models;
mod report;
mod store;

use crate::api::{AppState, create_router};
use crate::core::config::{CredentialStore, DataDirs, Settings};
use crate::core::logging::init_logging;
use crate::gateway::AiGateway;
use crate::images::ImageIntake;
use crate::store::{RecordStore, ScoreStore, TaskStore, TopicStore};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = match Settings::from_env() {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            eprintln!("Configuration Error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&settings.server.log_level);

    // Resolve and create the data directory layout
    let dirs = match DataDirs::resolve(&settings) {
        Ok(dirs) => Arc::new(dirs),
        Err(e) => {
            error!("Failed to prepare data directories: {}", e);
            std::process::exit(1);
        }
    };

    // Load credentials once; the system API can reload them later
    let credential_store = Arc::new(CredentialStore::new(&dirs.root));
    let credentials = credential_store.load();
    if credentials.modelscope().is_none() {
        warn!("MODELSCOPE_API_KEY 未配置，AI功能将使用占位符");
    }

    let gateway = Arc::new(AiGateway::new(&settings, credentials));
    let images = Arc::new(ImageIntake::new(dirs.temp.clone()));

    // Open the spreadsheet stores
    let stores = (
        ScoreStore::open(&dirs.data),
        TopicStore::open(&dirs.data),
        TaskStore::open(&dirs.data),
        RecordStore::open(&dirs.data),
    );
    let (scores, topics, tasks, records) = match stores {
        (Ok(scores), Ok(topics), Ok(tasks), Ok(records)) => (
            Arc::new(scores),
            Arc::new(topics),
            Arc::new(tasks),
            Arc::new(records),
        ),
        _ => {
            error!(
                "Failed to open spreadsheet stores under {}",
                dirs.data.display()
            );
            std::process::exit(1);
        }
    };

    print_startup_banner(&settings, &dirs);

    let state = AppState {
        settings: settings.clone(),
        dirs: dirs.clone(),
        gateway,
        images,
        scores,
        topics,
        tasks,
        records,
        credentials: credential_store,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Print startup banner with configuration
fn print_startup_banner(settings: &Settings, dirs: &DataDirs) {
    println!("📚 Study Helper Backend v0.1.0");
    println!("✅ Configuration loaded successfully");
    println!("   Data root: {}", dirs.root.display());
    println!("   Vision model: {}", settings.models.vision_model);
    println!("   Chat model: {}", settings.models.chat_model);
    println!(
        "   Request timeout: {}s",
        settings.providers.request_timeout
    );
    println!(
        "   Server: {}:{}",
        settings.server.host, settings.server.port
    );
    println!();
}
