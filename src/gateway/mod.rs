//! AI gateway
//!
//! Turns OCR, essay-optimization, structure-validation and chat requests
//! into calls against one of two OpenAI-compatible providers and normalizes
//! the result into domain-shaped data. Transport, parsing and validation
//! failures never escape to callers: every operation has a fixed fallback
//! value of the expected shape.
//!
//! Provider routing: OCR and essay operations are bound to the
//! vision-capable primary provider; chat prefers the lightweight provider
//! when its key is configured and falls back to the primary otherwise.

pub mod client;
pub mod extract;
pub mod placeholder;
pub mod prompts;
pub mod validate;

use crate::core::config::{Credentials, ModelConfig, ProviderConfig, Settings};
use crate::core::constants::role;
use crate::models::chat::ChatTurn;
use crate::models::completion::{CompletionMessage, CompletionRequest, ContentPart};
use crate::models::essays::OptimizationResult;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use client::{CompletionClient, ProviderError};
use extract::extract_json_span;
use serde_json::Value;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{info, warn};
use validate::validate_optimization_shape;

/// Which provider a call is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    /// Vision-capable primary provider (OCR, essays, chat fallback)
    Primary,
    /// Lightweight chat provider
    Lightweight,
}

/// Gateway over the two model providers
///
/// Credentials are an immutable snapshot swapped wholesale on reload; calls
/// read the snapshot once at operation start (last-read-wins).
pub struct AiGateway {
    client: CompletionClient,
    providers: ProviderConfig,
    models: ModelConfig,
    credentials: RwLock<Credentials>,
}

impl AiGateway {
    pub fn new(settings: &Settings, credentials: Credentials) -> Self {
        Self {
            client: CompletionClient::new(settings.providers.request_timeout),
            providers: settings.providers.clone(),
            models: settings.models.clone(),
            credentials: RwLock::new(credentials),
        }
    }

    /// Replace the credential snapshot with a freshly loaded one
    pub async fn reload_credentials(&self, credentials: Credentials) {
        *self.credentials.write().await = credentials;
    }

    /// Current credential snapshot
    pub async fn snapshot(&self) -> Credentials {
        self.credentials.read().await.clone()
    }

    /// One outbound completion call; logs model, input size and outcome
    async fn call(
        &self,
        route: Route,
        api_key: &str,
        model: &str,
        messages: Vec<CompletionMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let base_url = match route {
            Route::Primary => &self.providers.modelscope_base_url,
            Route::Lightweight => &self.providers.dashscope_base_url,
        };
        let request = CompletionRequest {
            model: model.to_string(),
            messages,
            temperature,
            max_tokens,
        };
        info!(
            "Calling model {} ({} message(s), max_tokens {})",
            model,
            request.messages.len(),
            max_tokens
        );
        let result = self.client.complete(base_url, api_key, &request).await;
        match &result {
            Ok(content) => info!("Model {} answered with {} chars", model, content.chars().count()),
            Err(e) => warn!("Model {} call failed: {}", model, e),
        }
        result
    }

    /// OCR a handwritten essay image into text
    ///
    /// Never fails: missing key, unreadable image or any provider failure
    /// yields the fixed placeholder transcription.
    pub async fn transcribe(&self, image_path: &Path, prompt: Option<&str>) -> String {
        let creds = self.snapshot().await;
        let Some(key) = creds.modelscope() else {
            info!("No primary provider key, using placeholder transcription");
            return placeholder::TRANSCRIPTION.to_string();
        };

        let Some(image) = read_image_base64(image_path) else {
            return placeholder::TRANSCRIPTION.to_string();
        };

        let prompt = prompt
            .filter(|p| !p.is_empty())
            .unwrap_or(prompts::OCR_PROMPT);
        let messages = vec![CompletionMessage::parts(
            role::USER,
            vec![
                ContentPart::text(prompt),
                ContentPart::image_base64(&image),
            ],
        )];

        match self
            .call(Route::Primary, key, &self.models.vision_model, messages, 0.1, 2000)
            .await
        {
            Ok(text) => text,
            Err(_) => {
                warn!("Transcription failed, using placeholder");
                placeholder::TRANSCRIPTION.to_string()
            }
        }
    }

    /// Optimize a student essay supplied as text
    ///
    /// The topic is passed as an optional image; the prompt template is
    /// selected by essay category. The model answer goes through span
    /// extraction, JSON parsing and structural validation; any failure
    /// substitutes the fixed placeholder result. The returned value always
    /// carries the caller's original text when the model omitted it.
    pub async fn optimize(
        &self,
        topic_image: Option<&Path>,
        reference: &str,
        original: &str,
        essay_category: &str,
    ) -> OptimizationResult {
        let creds = self.snapshot().await;
        let Some(key) = creds.modelscope() else {
            info!("No primary provider key, using placeholder optimization");
            return placeholder::optimization();
        };

        let template = prompts::optimization_template(essay_category);
        let prompt_text =
            prompts::render(template, &[("reference", reference), ("original", original)]);

        let messages = match topic_image.and_then(read_image_base64) {
            Some(image) => vec![CompletionMessage::parts(
                role::USER,
                vec![
                    ContentPart::text("请仔细分析以下英语作文。首先查看题目图片，理解题目要求："),
                    ContentPart::image_base64(&image),
                    ContentPart::text(prompt_text),
                ],
            )],
            None => vec![CompletionMessage::text(role::USER, prompt_text)],
        };

        let Ok(raw) = self
            .call(Route::Primary, key, &self.models.vision_model, messages, 0.5, 4000)
            .await
        else {
            return placeholder::optimization();
        };

        match parse_optimization(&raw, Some(original)) {
            Some(result) => result,
            None => {
                warn!(
                    "Unusable optimization answer, using placeholder (raw starts: {:.80})",
                    raw
                );
                placeholder::optimization()
            }
        }
    }

    /// Optimize a student essay supplied as an image
    ///
    /// Same contract as [`optimize`](Self::optimize), but the student text
    /// is read by the model from the essay image, so a result that omits
    /// `original_text` is unusable and becomes the placeholder.
    pub async fn optimize_with_images(
        &self,
        topic_image: &Path,
        essay_image: &Path,
        reference: &str,
        essay_category: &str,
    ) -> OptimizationResult {
        let creds = self.snapshot().await;
        let Some(key) = creds.modelscope() else {
            info!("No primary provider key, using placeholder optimization");
            return placeholder::optimization();
        };

        let prompt_text = prompts::render(
            prompts::IMAGE_OPTIMIZATION_PROMPT,
            &[("category", essay_category), ("reference", reference)],
        );

        let mut parts = vec![ContentPart::text("【题目图片】请先查看作文题目：")];
        if let Some(image) = read_image_base64(topic_image) {
            parts.push(ContentPart::image_base64(&image));
        }
        parts.push(ContentPart::text("\n【学生作文图片】以下是学生的手写作文："));
        if let Some(image) = read_image_base64(essay_image) {
            parts.push(ContentPart::image_base64(&image));
        }
        parts.push(ContentPart::text(format!("\n{}", prompt_text)));

        let messages = vec![CompletionMessage::parts(role::USER, parts)];

        let Ok(raw) = self
            .call(Route::Primary, key, &self.models.vision_model, messages, 0.5, 5000)
            .await
        else {
            return placeholder::optimization();
        };

        match parse_optimization(&raw, None) {
            Some(result) => result,
            None => {
                warn!("Unusable image-mode optimization answer, using placeholder");
                placeholder::optimization()
            }
        }
    }

    /// Validate the structure of an optimization payload
    ///
    /// Tier 1 is the local schema check and needs no network. With a primary
    /// key configured, a text-only model judges the payload instead and the
    /// answer counts as valid only when it contains "YES"
    /// (case-insensitive); a failed call resolves to `false`, never an
    /// error. Internal serialization problems fall back to the local check.
    pub async fn validate_structure(&self, candidate: &Value) -> bool {
        let creds = self.snapshot().await;
        let Some(key) = creds.modelscope() else {
            return validate_optimization_shape(candidate);
        };

        let Ok(payload) = serde_json::to_string_pretty(candidate) else {
            return validate_optimization_shape(candidate);
        };
        let prompt = prompts::render(prompts::STRUCTURE_VALIDATION_PROMPT, &[("json_data", &payload)]);
        let messages = vec![CompletionMessage::text(role::USER, prompt)];

        match self
            .call(Route::Primary, key, &self.models.validate_model, messages, 0.1, 500)
            .await
        {
            Ok(answer) => answer.to_uppercase().contains("YES"),
            Err(_) => false,
        }
    }

    /// Text-only chat turn
    ///
    /// Always returns a non-empty string; failures become apology text.
    pub async fn converse(&self, message: &str, history: &[ChatTurn]) -> String {
        self.chat_inner(message, None, history).await
    }

    /// Chat turn with an optional attached image
    pub async fn converse_with_image(
        &self,
        message: &str,
        image: Option<&Path>,
        history: &[ChatTurn],
    ) -> String {
        self.chat_inner(message, image, history).await
    }

    async fn chat_inner(
        &self,
        message: &str,
        image: Option<&Path>,
        history: &[ChatTurn],
    ) -> String {
        let creds = self.snapshot().await;

        let mut messages = vec![CompletionMessage::text(role::SYSTEM, prompts::CHAT_SYSTEM_PROMPT)];
        // History turns are carried as plain text; attached images are not
        // replayed to keep requests small.
        for turn in history {
            messages.push(CompletionMessage::text(&turn.role, turn.content.as_str()));
        }

        let image_data = image.and_then(read_image_base64);
        messages.push(match &image_data {
            Some(data) => CompletionMessage::parts(
                role::USER,
                vec![ContentPart::text(message), ContentPart::image_base64(data)],
            ),
            None => CompletionMessage::text(role::USER, message),
        });

        if let Some(key) = creds.dashscope() {
            match self
                .call(Route::Lightweight, key, &self.models.chat_model, messages, 0.7, 2000)
                .await
            {
                Ok(reply) => reply,
                Err(e) => apology(&e),
            }
        } else if let Some(key) = creds.modelscope() {
            let (model, max_tokens) = if image_data.is_some() {
                (self.models.vision_model.as_str(), 2000)
            } else {
                (self.models.optimize_model.as_str(), 1000)
            };
            match self
                .call(Route::Primary, key, model, messages, 0.7, max_tokens)
                .await
            {
                Ok(reply) => reply,
                Err(e) => apology(&e),
            }
        } else {
            placeholder::NOT_CONFIGURED_MESSAGE.to_string()
        }
    }
}

/// User-facing apology for a failed chat call
fn apology(error: &ProviderError) -> String {
    match error {
        ProviderError::Timeout => "抱歉，请求超时。请稍后再试。",
        ProviderError::Empty => "抱歉，AI没有返回有效内容。",
        ProviderError::Api { .. } => "抱歉，调用AI服务时出现错误。请稍后再试。",
        ProviderError::Transport(_) => "抱歉，处理您的请求时出现了问题。",
    }
    .to_string()
}

/// Read an image file and base64-encode it for inlining
///
/// No size ceiling is applied before encoding; arbitrarily large files are
/// inlined as-is.
fn read_image_base64(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(BASE64.encode(bytes)),
        Err(e) => {
            warn!("Failed to read image {}: {}", path.display(), e);
            None
        }
    }
}

/// Extract, parse and validate a model answer into a typed result
///
/// `fallback_original` is injected as `original_text` when the model omitted
/// the key. Returns `None` when no JSON span exists, parsing fails, the
/// structural invariant does not hold, or typed conversion fails.
fn parse_optimization(raw: &str, fallback_original: Option<&str>) -> Option<OptimizationResult> {
    let span = extract_json_span(raw)?;
    let mut value: Value = serde_json::from_str(span).ok()?;

    if let (Some(original), Some(map)) = (fallback_original, value.as_object_mut()) {
        map.entry("original_text")
            .or_insert_with(|| Value::String(original.to_string()));
    }

    if !validate_optimization_shape(&value) {
        return None;
    }
    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::essays::{EssayScore, SuggestionSet};
    use std::io::Write;

    fn settings_for(base_url: &str) -> Settings {
        let mut settings = Settings::default();
        settings.providers.modelscope_base_url = base_url.to_string();
        settings.providers.dashscope_base_url = base_url.to_string();
        settings.providers.request_timeout = 5;
        settings
    }

    fn gateway_with(base_url: &str, credentials: Credentials) -> AiGateway {
        AiGateway::new(&settings_for(base_url), credentials)
    }

    fn primary_only() -> Credentials {
        Credentials::new("ms-test-key".to_string(), String::new())
    }

    fn write_temp_image() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();
        file.flush().unwrap();
        file
    }

    fn completion_body(content: &str) -> String {
        serde_json::to_string(&serde_json::json!({
            "choices": [{"message": {"content": content}}]
        }))
        .unwrap()
    }

    const WRAPPED_ANSWER: &str = "Here you go: {\"original_text\":\"I want join camp\",\"score\":{\"level\":\"第三档\",\"points\":6},\"optimized_text\":\"...\",\"suggestions\":{\"topic_compliance\":[],\"spelling_errors\":[],\"grammar_errors\":[],\"word_optimization\":[],\"sentence_optimization\":[],\"structure_optimization\":[]}} Thanks!";

    #[test]
    fn test_parse_optimization_strips_prose() {
        let result = parse_optimization(WRAPPED_ANSWER, Some("ignored")).unwrap();
        assert_eq!(result.original_text, "I want join camp");
        assert_eq!(
            result.score,
            EssayScore {
                level: "第三档".to_string(),
                points: 6
            }
        );
        assert_eq!(result.optimized_text, "...");
        assert_eq!(result.suggestions, SuggestionSet::default());
    }

    #[test]
    fn test_parse_optimization_injects_missing_original_text() {
        let raw = r#"{"score":{"level":"第二档","points":8},"optimized_text":"better","suggestions":{"topic_compliance":[],"spelling_errors":[],"grammar_errors":[],"word_optimization":[],"sentence_optimization":[],"structure_optimization":[]}}"#;
        let result = parse_optimization(raw, Some("my essay")).unwrap();
        assert_eq!(result.original_text, "my essay");

        // Without a fallback the same answer is unusable
        assert!(parse_optimization(raw, None).is_none());
    }

    #[test]
    fn test_parse_optimization_rejects_garbage() {
        assert!(parse_optimization("no json at all", Some("x")).is_none());
        assert!(parse_optimization("{not valid json}", Some("x")).is_none());
        assert!(parse_optimization(r#"{"original_text":"a"}"#, Some("x")).is_none());
    }

    #[tokio::test]
    async fn test_optimize_returns_embedded_object_verbatim() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(WRAPPED_ANSWER))
            .create_async()
            .await;

        let gateway = gateway_with(&server.url(), primary_only());
        let result = gateway
            .optimize(None, "Dear Sir...", "I want join camp", "小作文")
            .await;
        assert_eq!(result.original_text, "I want join camp");
        assert_eq!(result.score.points, 6);
        assert_eq!(result.optimized_text, "...");
    }

    #[tokio::test]
    async fn test_optimize_falls_back_on_non_json_answer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("I could not grade this essay, sorry."))
            .create_async()
            .await;

        let gateway = gateway_with(&server.url(), primary_only());
        let result = gateway
            .optimize(None, "Dear Sir...", "I want join camp", "小作文")
            .await;
        assert_eq!(result, placeholder::optimization());
    }

    #[tokio::test]
    async fn test_optimize_with_images_parses_model_answer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(WRAPPED_ANSWER))
            .create_async()
            .await;

        let topic = write_temp_image();
        let essay = write_temp_image();
        let gateway = gateway_with(&server.url(), primary_only());
        let result = gateway
            .optimize_with_images(topic.path(), essay.path(), "Dear Sir...", "小作文")
            .await;
        assert_eq!(result.original_text, "I want join camp");
        assert_eq!(result.score.level, "第三档");
    }

    #[tokio::test]
    async fn test_optimize_without_credentials_skips_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let gateway = gateway_with(&server.url(), Credentials::default());
        let result = gateway.optimize(None, "ref", "orig", "大作文").await;
        assert_eq!(result, placeholder::optimization());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transcribe_without_credentials_skips_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let image = write_temp_image();
        let gateway = gateway_with(&server.url(), Credentials::default());
        assert_eq!(
            gateway.transcribe(image.path(), None).await,
            placeholder::TRANSCRIPTION
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transcribe_returns_placeholder_on_http_500() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let image = write_temp_image();
        let gateway = gateway_with(&server.url(), primary_only());
        let text = gateway.transcribe(image.path(), None).await;
        assert_eq!(text, placeholder::TRANSCRIPTION);
    }

    #[tokio::test]
    async fn test_transcribe_returns_model_text_on_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("Dear Tom,\nHow are you?"))
            .create_async()
            .await;

        let image = write_temp_image();
        let gateway = gateway_with(&server.url(), primary_only());
        let text = gateway.transcribe(image.path(), None).await;
        assert_eq!(text, "Dear Tom,\nHow are you?");
    }

    #[tokio::test]
    async fn test_validate_structure_local_tier_without_key() {
        let gateway = gateway_with("http://unused.invalid", Credentials::default());
        let valid = serde_json::to_value(placeholder::optimization()).unwrap();
        assert!(gateway.validate_structure(&valid).await);
        assert!(
            !gateway
                .validate_structure(&serde_json::json!({"original_text": "x"}))
                .await
        );
    }

    #[tokio::test]
    async fn test_validate_structure_network_tier_matches_yes() {
        let candidate = serde_json::to_value(placeholder::optimization()).unwrap();

        for (answer, expected) in [
            ("YES", true),
            ("yes, it is valid", true),
            ("NO", false),
            ("invalid", false),
        ] {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("POST", "/chat/completions")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(completion_body(answer))
                .create_async()
                .await;

            let gateway = gateway_with(&server.url(), primary_only());
            assert_eq!(
                gateway.validate_structure(&candidate).await,
                expected,
                "answer {answer:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_validate_structure_network_failure_yields_false() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let gateway = gateway_with(&server.url(), primary_only());
        let candidate = serde_json::to_value(placeholder::optimization()).unwrap();
        assert!(!gateway.validate_structure(&candidate).await);
    }

    #[tokio::test]
    async fn test_converse_without_credentials() {
        let gateway = gateway_with("http://unused.invalid", Credentials::default());
        let reply = gateway.converse("你好", &[]).await;
        assert_eq!(reply, placeholder::NOT_CONFIGURED_MESSAGE);
    }

    #[tokio::test]
    async fn test_converse_never_returns_empty_on_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        // Both routings must stay non-empty
        for creds in [
            primary_only(),
            Credentials::new(String::new(), "ds-test-key".to_string()),
        ] {
            let gateway = gateway_with(&server.url(), creds);
            let reply = gateway.converse("hello", &[]).await;
            assert!(!reply.is_empty());
        }
    }

    #[tokio::test]
    async fn test_converse_prefers_lightweight_provider() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer ds-test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("回答"))
            .create_async()
            .await;

        let gateway = gateway_with(
            &server.url(),
            Credentials::new("ms-test-key".to_string(), "ds-test-key".to_string()),
        );
        let history = vec![ChatTurn {
            role: "user".to_string(),
            content: "之前的问题".to_string(),
            image_url: None,
        }];
        let reply = gateway.converse("新问题", &history).await;
        assert_eq!(reply, "回答");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_credential_reload_swaps_the_snapshot() {
        let gateway = gateway_with("http://unused.invalid", Credentials::default());
        let reply = gateway.converse("hi", &[]).await;
        assert_eq!(reply, placeholder::NOT_CONFIGURED_MESSAGE);

        gateway.reload_credentials(primary_only()).await;
        assert_eq!(gateway.snapshot().await, primary_only());
    }
}
