//! Heuristic answer scoring.
//!
//! Scores are integers in `[0, 100]` computed from the answer text alone:
//! length, task-type keywords, paragraph structure, code fences and list
//! markers. Attached file names never contribute.

use serde::{Deserialize, Serialize};

use crate::model::{Task, TaskType};

/// Answers shorter than this (in characters, after trimming) are scored by length only.
pub const SHORT_ANSWER_CHARS: usize = 50;
/// Ceiling for short answers.
pub const SHORT_ANSWER_CAP: u8 = 40;
/// Length at which the length component saturates.
const FULL_LENGTH_CHARS: f64 = 500.0;
const LENGTH_WEIGHT: f64 = 30.0;
const KEYWORD_WEIGHT: f64 = 40.0;
const BONUS: f64 = 10.0;

/// Keywords rewarded for each task type.
pub fn keywords_for(task_type: TaskType) -> &'static [&'static str] {
    match task_type {
        TaskType::Coding => &[
            "function",
            "algorithm",
            "complexity",
            "test",
            "error",
            "performance",
            "refactor",
            "edge case",
        ],
        TaskType::Design => &[
            "user",
            "layout",
            "color",
            "typography",
            "accessibility",
            "prototype",
            "wireframe",
            "consistency",
        ],
        TaskType::Analysis => &[
            "data",
            "trend",
            "metric",
            "insight",
            "hypothesis",
            "conclusion",
            "comparison",
            "evidence",
        ],
        TaskType::Writing => &[
            "audience",
            "tone",
            "clarity",
            "structure",
            "message",
            "summary",
            "example",
            "conclusion",
        ],
        TaskType::Presentation => &[
            "slide",
            "audience",
            "story",
            "visual",
            "key point",
            "agenda",
            "takeaway",
            "call to action",
        ],
        TaskType::ProblemSolving => &[
            "problem",
            "root cause",
            "solution",
            "trade-off",
            "constraint",
            "approach",
            "risk",
            "alternative",
        ],
    }
}

/// The individual components that make up a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Trimmed length in characters.
    pub length_chars: usize,
    /// True when the answer was below [`SHORT_ANSWER_CHARS`].
    pub short_answer: bool,
    pub length: f64,
    pub keywords: f64,
    pub matched_keywords: Vec<String>,
    pub structure: f64,
    pub code_fence: f64,
    pub list_marker: f64,
    /// Final clamped and rounded score.
    pub total: u8,
}

/// Score an answer for a task. Deterministic and side-effect free.
pub fn score(answer_text: &str, task: &Task) -> u8 {
    score_breakdown(answer_text, task).total
}

/// Score an answer and report each component.
pub fn score_breakdown(answer_text: &str, task: &Task) -> ScoreBreakdown {
    let trimmed = answer_text.trim();
    let len = trimmed.chars().count();

    if len < SHORT_ANSWER_CHARS {
        return ScoreBreakdown {
            length_chars: len,
            short_answer: true,
            length: 0.0,
            keywords: 0.0,
            matched_keywords: Vec::new(),
            structure: 0.0,
            code_fence: 0.0,
            list_marker: 0.0,
            // len < 50 so this always fits
            total: (len as u8).min(SHORT_ANSWER_CAP),
        };
    }

    let length = (len as f64 / FULL_LENGTH_CHARS * LENGTH_WEIGHT).min(LENGTH_WEIGHT);

    let lowered = trimmed.to_lowercase();
    let keyword_set = keywords_for(task.task_type);
    let matched_keywords: Vec<String> = keyword_set
        .iter()
        .filter(|k| lowered.contains(*k))
        .map(|k| k.to_string())
        .collect();
    let keywords = if keyword_set.is_empty() {
        0.0
    } else {
        matched_keywords.len() as f64 / keyword_set.len() as f64 * KEYWORD_WEIGHT
    };

    let structure = if has_paragraph_break(trimmed) { BONUS } else { 0.0 };
    let code_fence = if task.task_type == TaskType::Coding && trimmed.contains("```") {
        BONUS
    } else {
        0.0
    };
    let list_marker = if trimmed.contains(['-', '*']) { BONUS } else { 0.0 };

    let raw = length + keywords + structure + code_fence + list_marker;
    let total = raw.clamp(0.0, 100.0).round() as u8;

    ScoreBreakdown {
        length_chars: len,
        short_answer: false,
        length,
        keywords,
        matched_keywords,
        structure,
        code_fence,
        list_marker,
        total,
    }
}

fn has_paragraph_break(text: &str) -> bool {
    text.contains("\n\n") || text.contains("\r\n\r\n")
}
