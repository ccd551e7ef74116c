//! Core data model types for worksim.
//!
//! Tasks and categories are defined statically and never mutated. Answers
//! are the working value for the task in focus; submissions are the frozen
//! record of one answered (or skipped) task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of work a task asks for. Drives keyword scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Coding,
    Design,
    Analysis,
    Writing,
    Presentation,
    ProblemSolving,
}

impl TaskType {
    /// All task types, in catalog display order.
    pub const ALL: [TaskType; 6] = [
        TaskType::Coding,
        TaskType::Design,
        TaskType::Analysis,
        TaskType::Writing,
        TaskType::Presentation,
        TaskType::ProblemSolving,
    ];
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::Coding => write!(f, "coding"),
            TaskType::Design => write!(f, "design"),
            TaskType::Analysis => write!(f, "analysis"),
            TaskType::Writing => write!(f, "writing"),
            TaskType::Presentation => write!(f, "presentation"),
            TaskType::ProblemSolving => write!(f, "problem-solving"),
        }
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coding" => Ok(TaskType::Coding),
            "design" => Ok(TaskType::Design),
            "analysis" => Ok(TaskType::Analysis),
            "writing" => Ok(TaskType::Writing),
            "presentation" => Ok(TaskType::Presentation),
            "problem-solving" | "problem_solving" | "problemsolving" => {
                Ok(TaskType::ProblemSolving)
            }
            other => Err(format!("unknown task type: {other}")),
        }
    }
}

/// Difficulty tag shown alongside a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" | "easy" => Ok(Difficulty::Beginner),
            "intermediate" | "medium" => Ok(Difficulty::Intermediate),
            "advanced" | "hard" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A weighted evaluation criterion attached to a task.
///
/// Weights are informational; nothing requires them to sum to 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub weight: u8,
    #[serde(default)]
    pub description: String,
}

/// A single timed task inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for this task.
    pub id: String,
    /// The category this task belongs to.
    pub category_id: String,
    /// What kind of work the task asks for.
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// Short title.
    pub title: String,
    /// Problem statement shown to the candidate.
    #[serde(default)]
    pub description: String,
    /// Ordered instruction steps.
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Time allotted for this task, in minutes.
    pub time_limit_minutes: u32,
    /// Maximum score advertised for this task.
    #[serde(default = "default_max_score")]
    pub max_score: u32,
    /// Weighted evaluation criteria.
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    /// Difficulty tag.
    pub difficulty: Difficulty,
}

fn default_max_score() -> u32 {
    100
}

impl Task {
    /// Time limit in seconds.
    pub fn time_limit_secs(&self) -> u64 {
        u64::from(self.time_limit_minutes) * 60
    }
}

/// A named skill track with an ordered task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Which answer channel is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Text,
    Code,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Text => write!(f, "text"),
            InputMode::Code => write!(f, "code"),
        }
    }
}

/// The working answer for the task in focus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default)]
    pub mode: InputMode,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub code: String,
    /// Names of attached files. Contents are never scored.
    #[serde(default)]
    pub files: Vec<String>,
}

impl Answer {
    /// A text-mode answer.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            mode: InputMode::Text,
            text: text.into(),
            ..Default::default()
        }
    }

    /// A code-mode answer.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            mode: InputMode::Code,
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_file(mut self, name: impl Into<String>) -> Self {
        self.files.push(name.into());
        self
    }

    /// The content of the channel selected by `mode`.
    pub fn active_content(&self) -> &str {
        match self.mode {
            InputMode::Text => &self.text,
            InputMode::Code => &self.code,
        }
    }

    /// Mutable access to the active channel.
    pub fn active_content_mut(&mut self) -> &mut String {
        match self.mode {
            InputMode::Text => &mut self.text,
            InputMode::Code => &mut self.code,
        }
    }

    /// No active content and no attached files.
    pub fn is_empty(&self) -> bool {
        self.active_content().trim().is_empty() && self.files.is_empty()
    }
}

/// Frozen record of one task's answer, time spent and score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub task_id: String,
    pub answer: Answer,
    pub time_spent_secs: u64,
    pub score: u8,
    /// Explicit null attempt via skip.
    #[serde(default)]
    pub skipped: bool,
    /// Captured by the timer on global expiry.
    #[serde(default)]
    pub auto_submitted: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Opaque candidate identity, passed through unchanged to the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
}
