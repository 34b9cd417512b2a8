//! Domain constants
//!
//! String constants used throughout the application for message roles,
//! essay categories, subjects and the default daily task list.

/// Message role constants
pub mod role {
    /// User role identifier
    pub const USER: &str = "user";

    /// Assistant role identifier
    pub const ASSISTANT: &str = "assistant";

    /// System role identifier
    pub const SYSTEM: &str = "system";
}

/// Essay category constants
pub mod essay {
    /// Short-form letter/notice essay (约100词)
    pub const SMALL: &str = "小作文";

    /// Long-form chart/picture essay
    pub const LARGE: &str = "大作文";

    /// The two categories every topic belongs to
    pub const CATEGORIES: [&str; 2] = [SMALL, LARGE];
}

/// Exam subjects and the paper types accepted for each
pub mod subject {
    pub const MATH: &str = "数学";
    pub const MAJOR: &str = "专业课";
    pub const ENGLISH: &str = "英语";

    pub const MATH_PAPER_TYPES: [&str; 6] = [
        "真题",
        "合工大超越卷",
        "张宇四套卷",
        "李林四套卷",
        "李艳芳三套卷",
        "其他",
    ];
    pub const MAJOR_PAPER_TYPES: [&str; 3] = ["真题", "模拟题", "其他"];
    pub const ENGLISH_PAPER_TYPES: [&str; 2] = ["真题", "其他"];

    /// Paper types for a subject, or None for an unknown subject
    pub fn paper_types(subject: &str) -> Option<&'static [&'static str]> {
        match subject {
            MATH => Some(&MATH_PAPER_TYPES),
            MAJOR => Some(&MAJOR_PAPER_TYPES),
            ENGLISH => Some(&ENGLISH_PAPER_TYPES),
            _ => None,
        }
    }
}

/// Tasks seeded for a date that has none yet
pub const DEFAULT_DAILY_TASKS: [&str; 4] = ["数学练习", "英语阅读", "专业课复习", "错题整理"];
