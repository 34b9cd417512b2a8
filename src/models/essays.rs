//! Essay workflow data models
//!
//! Domain types for the essay-practice feature: topics, AI optimization
//! results and the request/response schemas of the essay endpoints.

use serde::{Deserialize, Serialize};

/// Score assigned to an essay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssayScore {
    /// Grade band, e.g. "第三档"
    pub level: String,
    /// Points within the band
    pub points: i64,
}

/// The six fixed suggestion categories
///
/// Every category is a list; an empty list means "nothing to report" and is
/// still structurally valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub topic_compliance: Vec<String>,
    pub spelling_errors: Vec<String>,
    pub grammar_errors: Vec<String>,
    pub word_optimization: Vec<String>,
    pub sentence_optimization: Vec<String>,
    pub structure_optimization: Vec<String>,
}

/// A fully-formed essay optimization result
///
/// Either every field is present with the right shape, or the whole value is
/// replaced by the placeholder — partial results never reach callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub original_text: String,
    pub score: EssayScore,
    pub optimized_text: String,
    pub suggestions: SuggestionSet,
}

/// Request body for POST /essays/analyze
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub year: i32,
    pub essay_type: String,
    pub original_text: String,
    #[serde(default)]
    pub topic_image_path: Option<String>,
    pub reference_essay: String,
}

/// Response body for POST /essays/analyze
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub topic: String,
    pub topic_image_path: Option<String>,
    pub reference_essay: String,
    pub original_text: String,
    pub score: EssayScore,
    pub optimized_text: String,
    pub suggestions: SuggestionSet,
}

/// Request body for POST /essays/save
#[derive(Debug, Clone, Deserialize)]
pub struct SaveAnalysisRequest {
    pub year: i32,
    pub data: serde_json::Value,
}

/// Response body for POST /essays/ocr
#[derive(Debug, Clone, Serialize)]
pub struct OcrResponse {
    pub original_text: String,
    pub essay_image_path: String,
    pub topic: String,
    pub topic_image_path: String,
    pub reference_essay: String,
}
