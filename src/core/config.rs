//! Application configuration management
//!
//! Settings are loaded from a TOML file at startup and are immutable for the
//! lifetime of the process. Provider credentials live in a small JSON file
//! under the data root so the desktop frontend can write them at runtime; a
//! reload produces a fresh `Credentials` value instead of mutating shared
//! state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default request timeout for provider calls, in seconds
const DEFAULT_REQUEST_TIMEOUT: u64 = 120;

/// Default server port
const DEFAULT_PORT: u16 = 8000;

/// Credentials file name under the data root
const CREDENTIALS_FILE: &str = "api_config.json";

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_modelscope_base")]
    pub modelscope_base_url: String,
    #[serde(default = "default_dashscope_base")]
    pub dashscope_base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            modelscope_base_url: default_modelscope_base(),
            dashscope_base_url: default_dashscope_base(),
            request_timeout: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Multimodal model used for OCR and essay optimization
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    /// Text-only model used for chat when routed to the primary provider
    #[serde(default = "default_optimize_model")]
    pub optimize_model: String,
    /// Small model used for structure validation
    #[serde(default = "default_validate_model")]
    pub validate_model: String,
    /// Multimodal chat model on the lightweight provider
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vision_model: default_vision_model(),
            optimize_model: default_optimize_model(),
            validate_model: default_validate_model(),
            chat_model: default_chat_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_modelscope_base() -> String {
    "https://api-inference.modelscope.cn/v1".to_string()
}

fn default_dashscope_base() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_vision_model() -> String {
    "Qwen/Qwen3-VL-30B-A3B-Thinking".to_string()
}

fn default_optimize_model() -> String {
    "Qwen/Qwen3-30B-A3B-Thinking-2507".to_string()
}

fn default_validate_model() -> String {
    "Qwen/Qwen3-30B-A3B-Instruct-2507".to_string()
}

fn default_chat_model() -> String {
    "qwen-vl-plus".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Application settings loaded from TOML
///
/// Every section is optional; a missing file yields the defaults, so the
/// application starts with zero setup.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
    #[serde(default)]
    pub models: ModelConfig,
    /// Overrides the data root (also settable via STUDY_HELPER_DATA_ROOT)
    #[serde(default)]
    pub data_root: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).context("Failed to read configuration file")?;
        let settings: Settings =
            toml::from_str(&content).context("Failed to parse TOML configuration")?;
        Ok(settings)
    }

    /// Load settings from the path in CONFIG_PATH, defaulting to config.toml
    pub fn from_env() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::from_file(config_path)
    }
}

/// API keys for the two providers
///
/// Both keys are optional; an absent key makes the corresponding provider
/// unreachable and the gateway degrades to placeholder output. The value is
/// immutable — reloading builds a new one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    #[serde(default, rename = "MODELSCOPE_API_KEY")]
    pub modelscope_api_key: String,
    #[serde(default, rename = "DASHSCOPE_API_KEY")]
    pub dashscope_api_key: String,
}

impl Credentials {
    pub fn new(modelscope_api_key: String, dashscope_api_key: String) -> Self {
        Self {
            modelscope_api_key,
            dashscope_api_key,
        }
    }

    /// Key for the vision-capable primary provider, if configured
    pub fn modelscope(&self) -> Option<&str> {
        non_empty(&self.modelscope_api_key)
    }

    /// Key for the lightweight chat provider, if configured
    pub fn dashscope(&self) -> Option<&str> {
        non_empty(&self.dashscope_api_key)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Reads and writes the credentials file under the data root
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(data_root: &Path) -> Self {
        Self {
            path: data_root.join(CREDENTIALS_FILE),
        }
    }

    /// Whether the credentials file has been written
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load credentials from the file, falling back to environment variables
    /// when the file is absent (development workflow).
    pub fn load(&self) -> Credentials {
        if let Ok(content) = fs::read_to_string(&self.path) {
            match serde_json::from_str::<Credentials>(&content) {
                Ok(creds) => return creds,
                Err(e) => {
                    tracing::warn!("Ignoring malformed credentials file: {}", e);
                }
            }
        }
        Credentials::new(
            std::env::var("MODELSCOPE_API_KEY").unwrap_or_default(),
            std::env::var("DASHSCOPE_API_KEY").unwrap_or_default(),
        )
    }

    /// Persist credentials as pretty-printed JSON
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let content =
            serde_json::to_string_pretty(credentials).context("Failed to encode credentials")?;
        fs::write(&self.path, content).context("Failed to write credentials file")?;
        Ok(())
    }
}

/// Directory layout under the data root
///
/// All directories are created eagerly so handlers never have to care.
#[derive(Debug, Clone)]
pub struct DataDirs {
    pub root: PathBuf,
    pub data: PathBuf,
    pub topics: PathBuf,
    pub temp: PathBuf,
    pub essays_output: PathBuf,
    pub chat_history: PathBuf,
}

impl DataDirs {
    /// Resolve the data root: STUDY_HELPER_DATA_ROOT env var, then the
    /// settings override, then ./study-helper next to the executable.
    pub fn resolve(settings: &Settings) -> Result<Self> {
        let root = match std::env::var("STUDY_HELPER_DATA_ROOT") {
            Ok(value) if !value.is_empty() => PathBuf::from(value),
            _ => settings
                .data_root
                .clone()
                .unwrap_or_else(|| PathBuf::from("study-helper")),
        };
        Self::at(root)
    }

    /// Build the layout rooted at the given directory, creating everything
    pub fn at(root: PathBuf) -> Result<Self> {
        let data = root.join("data");
        let topics = data.join("topics");
        let temp = root.join("temp");
        let output = root.join("output");
        let essays_output = output.join("essays");
        let chat_history = output.join("chat_history");
        for dir in [&data, &topics, &temp, &essays_output, &chat_history] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(Self {
            root,
            data,
            topics,
            temp,
            essays_output,
            chat_history,
        })
    }

    /// Resolve a stored relative path (e.g. "data/topics/x.jpg") against the
    /// data root; absolute paths pass through unchanged.
    pub fn resolve_stored_path(&self, stored: &str) -> PathBuf {
        let path = Path::new(stored);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    fn create_test_settings() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            log_level = "debug"

            [providers]
            request_timeout = 60

            [models]
            chat_model = "qwen-vl-max"
        "#
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_settings() {
        let file = create_test_settings();
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.providers.request_timeout, 60);
        assert_eq!(settings.models.chat_model, "qwen-vl-max");
        // Unspecified values fall back to defaults
        assert_eq!(settings.models.vision_model, default_vision_model());
    }

    #[test]
    fn test_missing_settings_file_yields_defaults() {
        let settings = Settings::from_file("does-not-exist.toml").unwrap();
        assert_eq!(settings.server.port, DEFAULT_PORT);
        assert_eq!(settings.providers.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_credentials_presence() {
        let creds = Credentials::new("ms-key".to_string(), String::new());
        assert_eq!(creds.modelscope(), Some("ms-key"));
        assert_eq!(creds.dashscope(), None);
    }

    #[test]
    fn test_credential_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        assert!(!store.exists());

        let creds = Credentials::new("ms".to_string(), "ds".to_string());
        store.save(&creds).unwrap();
        assert!(store.exists());
        assert_eq!(store.load(), creds);
    }

    #[test]
    fn test_data_dirs_layout() {
        let dir = tempdir().unwrap();
        let dirs = DataDirs::at(dir.path().join("study-helper")).unwrap();
        assert!(dirs.topics.is_dir());
        assert!(dirs.temp.is_dir());
        assert!(dirs.chat_history.is_dir());
        assert_eq!(
            dirs.resolve_stored_path("data/topics/a.jpg"),
            dirs.root.join("data/topics/a.jpg")
        );
    }
}
