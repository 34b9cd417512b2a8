//! Prompt templates for the AI gateway
//!
//! Templates carry named `{placeholder}` slots filled by [`render`]. The
//! JSON example blocks inside the templates use braces too, but only exact
//! `{name}` slots passed to `render` are ever substituted.

use crate::core::constants::essay;

/// Fill `{name}` slots in a template
///
/// Unknown text, including literal braces in JSON examples, is left
/// untouched.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

/// Optimization template for an essay category
///
/// Two known categories, each with its own grading guidance, plus a generic
/// fallback.
pub fn optimization_template(category: &str) -> &'static str {
    match category {
        essay::SMALL => SMALL_ESSAY_OPTIMIZATION_PROMPT,
        essay::LARGE => LARGE_ESSAY_OPTIMIZATION_PROMPT,
        _ => ESSAY_OPTIMIZATION_PROMPT,
    }
}

/// Appends the shared JSON output contract to a template body
macro_rules! with_json_contract {
    ($body:literal) => {
        concat!(
            $body,
            r#"你必须返回严格的JSON格式，包含以下字段（非常重要）：
{
    "original_text": "学生原文（保留所有错误）",
    "score": {
        "level": "档位，如第三档",
        "points": 分数（整数）
    },
    "optimized_text": "优化后的完整作文内容",
    "suggestions": {
        "topic_compliance": ["关于主题贴合度的分析和建议"],
        "spelling_errors": ["拼写错误列表"],
        "grammar_errors": ["语法错误列表"],
        "word_optimization": ["词汇优化建议"],
        "sentence_optimization": ["句子优化建议"],
        "structure_optimization": ["文章结构优化建议"]
    }
}

请确保返回的是有效的JSON格式，不要包含任何额外的文字说明。"#
        )
    };
}

/// OCR instruction for handwritten essays
pub const OCR_PROMPT: &str = r#"请识别图片中的英语手写作文，逐字转写为文本。
要求：
1. 严格保留原文中的所有拼写错误和语法错误，不要修正
2. 保留原有的分段和换行
3. 只输出识别出的正文，不要添加任何解释或说明"#;

/// Generic essay optimization template ({reference}, {original})
pub const ESSAY_OPTIMIZATION_PROMPT: &str = with_json_contract!(
    r#"你是一名资深的考研英语作文阅卷老师。请对照题目和参考范文，分析并优化学生的作文。

【作文题目】
见上方题目图片

【参考范文】
{reference}

【学生原文】
{original}

请逐项检查拼写、语法、用词、句式和篇章结构，按考研英语评分标准给出档位和分数，并给出优化后的完整作文。

"#
);

/// Short-essay (小作文) optimization template ({reference}, {original})
pub const SMALL_ESSAY_OPTIMIZATION_PROMPT: &str = with_json_contract!(
    r#"你是一名资深的考研英语作文阅卷老师。本篇为小作文（应用文，满分10分），请重点检查书信/通知的格式（称呼、落款）、语域是否得体、要点是否覆盖。

【作文题目】
见上方题目图片

【参考范文】
{reference}

【学生原文】
{original}

请逐项检查拼写、语法、用词、句式和篇章结构，按小作文评分标准给出档位和分数（0-10分），并给出优化后的完整作文。

"#
);

/// Long-essay (大作文) optimization template ({reference}, {original})
pub const LARGE_ESSAY_OPTIMIZATION_PROMPT: &str = with_json_contract!(
    r#"你是一名资深的考研英语作文阅卷老师。本篇为大作文（图画/图表作文，满分20分），请重点检查图画描述是否准确、论证是否充分、结构是否完整（描述-论证-总结）。

【作文题目】
见上方题目图片

【参考范文】
{reference}

【学生原文】
{original}

请逐项检查拼写、语法、用词、句式和篇章结构，按大作文评分标准给出档位和分数（0-20分），并给出优化后的完整作文。

"#
);

/// Image-mode optimization template ({category}, {reference})
///
/// The student text is read by the model from the essay image, so there is
/// no {original} slot.
pub const IMAGE_OPTIMIZATION_PROMPT: &str = with_json_contract!(
    r#"你是一名资深的考研英语作文阅卷老师。作文类型：{category}。

【参考范文】
{reference}

以上提供了题目图片和学生手写作文图片，请按以下步骤分析：

1. 仔细查看题目图片，理解题目要求、格式和评分标准
2. 识别学生手写作文的所有内容（严格保留原文中的所有拼写和语法错误，不要修正）
3. 对照题目和参考范文进行深度分析
4. 按评分标准给出档位和分数，并给出优化建议

"#
);

/// Yes/no structure validation prompt ({json_data})
pub const STRUCTURE_VALIDATION_PROMPT: &str = r#"请判断下面的JSON数据是否为一份完整有效的作文批改结果。
它必须包含 original_text、score（含 level 和 points）、optimized_text 以及 suggestions 下的六个建议列表。

{json_data}

如果结构完整有效，只回答 YES；否则只回答 NO。"#;

/// System persona for the chat assistant
pub const CHAT_SYSTEM_PROMPT: &str = r#"你是一位耐心、专业的考研学习助手，擅长数学、英语和专业课答疑。
回答使用Markdown格式，数学公式使用LaTeX，解题时先给思路再给步骤，语气友好简洁。"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_named_slots() {
        let out = render("A {x} and {y}.", &[("x", "one"), ("y", "two")]);
        assert_eq!(out, "A one and two.");
    }

    #[test]
    fn test_render_leaves_unknown_text_untouched() {
        let out = render(r#"{"k":"v"} and {slot}"#, &[("slot", "filled")]);
        assert_eq!(out, r#"{"k":"v"} and filled"#);
    }

    #[test]
    fn test_optimization_template_selection() {
        assert!(optimization_template("小作文").contains("小作文"));
        assert!(optimization_template("大作文").contains("大作文"));
        // Unknown category falls back to the generic template
        assert_eq!(optimization_template("其他"), ESSAY_OPTIMIZATION_PROMPT);
    }

    #[test]
    fn test_templates_carry_their_slots() {
        for template in [
            ESSAY_OPTIMIZATION_PROMPT,
            SMALL_ESSAY_OPTIMIZATION_PROMPT,
            LARGE_ESSAY_OPTIMIZATION_PROMPT,
        ] {
            assert!(template.contains("{reference}"));
            assert!(template.contains("{original}"));
        }
        assert!(IMAGE_OPTIMIZATION_PROMPT.contains("{reference}"));
        assert!(IMAGE_OPTIMIZATION_PROMPT.contains("{category}"));
        assert!(STRUCTURE_VALIDATION_PROMPT.contains("{json_data}"));
    }
}
