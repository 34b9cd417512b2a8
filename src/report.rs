//! Markdown report generation
//!
//! Renders the essay analysis report and the chat transcript export. Both
//! are written under the output directory; chat images land in a sibling
//! `.assets` folder so the Markdown stays portable.

use crate::models::chat::ChatTurn;
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Local;
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Result of a chat transcript export
#[derive(Debug, Clone)]
pub struct ChatExport {
    pub file_path: PathBuf,
    pub filename: String,
    pub images_saved: usize,
}

/// Render the essay analysis report
///
/// `data` is the loose analysis payload assembled by the frontend; missing
/// fields degrade to empty sections rather than failing the export.
pub fn essay_analysis_markdown(year: i32, data: &Value) -> String {
    let mut out = String::new();

    let score = data.get("score");
    let score_text = match score {
        Some(score) => format!(
            "\n**评分**: {}分 ({})\n",
            score.get("points").and_then(Value::as_i64).unwrap_or(0),
            score
                .get("level")
                .and_then(Value::as_str)
                .unwrap_or("未评分"),
        ),
        None => String::new(),
    };

    let _ = write!(
        out,
        "# 英语作文分析报告\n\n\
         **年份**: {year}\n\
         **作文类型**: {essay_type}\n\
         {score_text}**生成时间**: {now}\n\n\
         ---\n\n\
         ## 📝 题目\n\n{topic}\n\n\
         ---\n\n\
         ## 📚 参考范文\n\n```\n{reference}\n```\n\n\
         ---\n\n\
         ## 📊 作文对比\n\n\
         ### 原文\n\n```\n{original}\n```\n\n\
         ### 优化后\n\n```\n{optimized}\n```\n\n\
         ---\n\n\
         ## 💡 修改建议\n",
        year = year,
        essay_type = str_field(data, "essay_type"),
        score_text = score_text,
        now = Local::now().format("%Y-%m-%d %H:%M:%S"),
        topic = str_field(data, "topic"),
        reference = str_field(data, "reference_essay"),
        original = str_field(data, "original_text"),
        optimized = str_field(data, "optimized_text"),
    );

    let suggestions = data.get("suggestions").cloned().unwrap_or(Value::Null);
    // topic_compliance with a fallback to the legacy topic_relevance key
    let topic_items = suggestions
        .get("topic_compliance")
        .filter(|v| !is_empty_items(v))
        .or_else(|| suggestions.get("topic_relevance"))
        .cloned();
    push_section(&mut out, "1. 题意符合度", topic_items.as_ref(), "无建议");
    push_section(
        &mut out,
        "2. 拼写错误",
        suggestions.get("spelling_errors"),
        "无拼写错误",
    );
    push_section(
        &mut out,
        "3. 语法错误",
        suggestions.get("grammar_errors"),
        "无语法错误",
    );
    push_section(
        &mut out,
        "4. 单词优化",
        suggestions.get("word_optimization"),
        "无需优化",
    );
    push_section(
        &mut out,
        "5. 句式优化",
        suggestions.get("sentence_optimization"),
        "无需优化",
    );
    push_section(
        &mut out,
        "6. 结构优化",
        suggestions.get("structure_optimization"),
        "无需优化",
    );

    out.push_str("\n\n---\n\n*该报告由Study Helper自动生成*\n");
    out
}

/// Write the essay analysis report into the output directory
pub fn save_essay_analysis(output_dir: &Path, year: i32, data: &Value) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).context("Failed to create report directory")?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let file_path = output_dir.join(format!("essay_analysis_{year}_{timestamp}.md"));
    fs::write(&file_path, essay_analysis_markdown(year, data))
        .context("Failed to write report file")?;
    Ok(file_path)
}

/// Export a chat transcript as Markdown with an assets folder for images
pub fn save_chat_history(output_dir: &Path, messages: &[ChatTurn]) -> Result<ChatExport> {
    fs::create_dir_all(output_dir).context("Failed to create chat history directory")?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let base_name = format!("chat_history_{timestamp}");
    let md_filename = format!("{base_name}.md");
    let assets_folder_name = format!("{base_name}.assets");
    let file_path = output_dir.join(&md_filename);
    let assets_dir = output_dir.join(&assets_folder_name);

    let mut images_saved = 0usize;
    let mut out = format!(
        "# 学习助手对话记录\n\n**保存时间**: {}\n\n---\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    for turn in messages {
        let role_name = if turn.role == "user" {
            "👤 用户"
        } else {
            "🤖 AI助手"
        };
        let _ = write!(out, "## {role_name}\n\n");

        if let Some(image_url) = &turn.image_url {
            out.push_str(&render_image(
                image_url,
                &assets_dir,
                &assets_folder_name,
                &mut images_saved,
            ));
        }

        let _ = write!(out, "{}\n\n---\n\n", turn.content);
    }

    out.push_str("*该对话记录由Study Helper自动生成*\n");
    fs::write(&file_path, out).context("Failed to write chat history file")?;

    Ok(ChatExport {
        file_path,
        filename: md_filename,
        images_saved,
    })
}

/// Materialize one image reference into Markdown, saving assets as needed
fn render_image(
    image_url: &str,
    assets_dir: &Path,
    assets_folder_name: &str,
    images_saved: &mut usize,
) -> String {
    if let Some(rest) = image_url.strip_prefix("data:image/") {
        // Inline base64 payload: decode into the assets folder
        let Some((format, payload)) = rest.split_once(";base64,") else {
            return "*[图片格式不支持]*\n\n".to_string();
        };
        match BASE64.decode(payload) {
            Ok(bytes) => {
                if let Err(e) = fs::create_dir_all(assets_dir) {
                    warn!("Failed to create assets directory: {}", e);
                    return "*[图片保存失败]*\n\n".to_string();
                }
                *images_saved += 1;
                let image_filename = format!("image_{}.{}", images_saved, format);
                let image_path = assets_dir.join(&image_filename);
                match fs::write(&image_path, bytes) {
                    Ok(()) => {
                        format!("![图片](./{assets_folder_name}/{image_filename})\n\n")
                    }
                    Err(e) => {
                        warn!("Failed to save chat image: {}", e);
                        *images_saved -= 1;
                        "*[图片保存失败]*\n\n".to_string()
                    }
                }
            }
            Err(e) => {
                warn!("Failed to decode chat image: {}", e);
                "*[图片保存失败]*\n\n".to_string()
            }
        }
    } else if image_url.starts_with("http") {
        format!("![图片]({image_url})\n\n")
    } else {
        // Local file path: copy it into the assets folder
        let source = Path::new(image_url);
        if source.is_file() {
            if let Err(e) = fs::create_dir_all(assets_dir) {
                warn!("Failed to create assets directory: {}", e);
                return format!("*[图片路径: {image_url}]*\n\n");
            }
            *images_saved += 1;
            let ext = source
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            let image_filename = format!("image_{}{}", images_saved, ext);
            let image_path = assets_dir.join(&image_filename);
            match fs::copy(source, &image_path) {
                Ok(_) => format!("![图片](./{assets_folder_name}/{image_filename})\n\n"),
                Err(e) => {
                    warn!("Failed to copy chat image: {}", e);
                    *images_saved -= 1;
                    format!("*[图片路径: {image_url}]*\n\n")
                }
            }
        } else {
            format!("*[图片文件不存在: {image_url}]*\n\n")
        }
    }
}

/// Render one suggestion section with a fallback line when empty
fn push_section(out: &mut String, title: &str, items: Option<&Value>, empty_text: &str) {
    let _ = write!(out, "\n### {title}\n\n");
    match items {
        Some(Value::Array(list)) if !list.is_empty() => {
            for item in list {
                match item.as_str() {
                    Some(text) => {
                        let _ = writeln!(out, "- {text}");
                    }
                    None => {
                        let _ = writeln!(out, "- {item}");
                    }
                }
            }
        }
        Some(Value::String(text)) if !text.is_empty() => {
            let _ = writeln!(out, "{text}");
        }
        _ => {
            let _ = writeln!(out, "{empty_text}");
        }
    }
}

fn is_empty_items(value: &Value) -> bool {
    match value {
        Value::Array(list) => list.is_empty(),
        Value::String(text) => text.is_empty(),
        _ => true,
    }
}

fn str_field<'a>(data: &'a Value, field: &str) -> &'a str {
    data.get(field).and_then(Value::as_str).unwrap_or("")
}
