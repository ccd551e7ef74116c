//! Task catalog access and TOML catalog loading.
//!
//! A catalog maps category ids to ordered task lists. Order is significant:
//! it is both the presentation order and the scoring order.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Category, Criterion, Difficulty, Task, TaskType};

/// Read-only source of tasks for the engine.
pub trait TaskCatalog: Send + Sync {
    /// Tasks for a category, in order. Unknown categories yield an empty list.
    fn tasks_for_category(&self, category_id: &str) -> Vec<Task>;

    /// Summaries of all known categories.
    fn categories(&self) -> Vec<CategorySummary>;
}

/// Summary of a category (without the full task definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub task_count: usize,
    /// Sum of task time limits, in minutes.
    pub total_minutes: u32,
}

/// In-memory catalog built from parsed categories.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    categories: Vec<Category>,
}

impl StaticCatalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Load a catalog from a single file or a directory of `.toml` files.
    pub fn load(path: &Path) -> Result<Self> {
        let categories = if path.is_dir() {
            load_catalog_directory(path)?
        } else {
            vec![parse_category(path)?]
        };
        Ok(Self::new(categories))
    }

    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Find a task by id across all categories.
    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.categories
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.id == task_id)
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }
}

impl TaskCatalog for StaticCatalog {
    fn tasks_for_category(&self, category_id: &str) -> Vec<Task> {
        self.category(category_id)
            .map(|c| c.tasks.clone())
            .unwrap_or_default()
    }

    fn categories(&self) -> Vec<CategorySummary> {
        self.categories
            .iter()
            .map(|c| CategorySummary {
                id: c.id.clone(),
                name: c.name.clone(),
                task_count: c.tasks.len(),
                total_minutes: c.tasks.iter().map(|t| t.time_limit_minutes).sum(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TOML parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    category: TomlCategoryHeader,
    #[serde(default)]
    tasks: Vec<TomlTask>,
}

#[derive(Debug, Deserialize)]
struct TomlCategoryHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlTask {
    id: String,
    #[serde(rename = "type")]
    task_type: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    instructions: Vec<String>,
    time_limit_minutes: u32,
    #[serde(default = "default_max_score")]
    max_score: u32,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default)]
    criteria: Vec<TomlCriterion>,
}

#[derive(Debug, Deserialize)]
struct TomlCriterion {
    name: String,
    weight: u8,
    #[serde(default)]
    description: String,
}

fn default_max_score() -> u32 {
    100
}

fn default_difficulty() -> String {
    "intermediate".to_string()
}

/// Parse a single TOML catalog file into a `Category`.
pub fn parse_category(path: &Path) -> Result<Category> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_category_str(&content, path)
}

/// Parse a TOML string into a `Category` (useful for testing).
pub fn parse_category_str(content: &str, source_path: &Path) -> Result<Category> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let category_id = parsed.category.id;

    let tasks = parsed
        .tasks
        .into_iter()
        .map(|t| {
            let task_type: TaskType = t
                .task_type
                .parse()
                .map_err(|e: String| anyhow::anyhow!("task {}: {}", t.id, e))?;
            let difficulty: Difficulty = t
                .difficulty
                .parse()
                .map_err(|e: String| anyhow::anyhow!("task {}: {}", t.id, e))?;

            let criteria = t
                .criteria
                .into_iter()
                .map(|c| Criterion {
                    name: c.name,
                    weight: c.weight,
                    description: c.description,
                })
                .collect();

            Ok(Task {
                id: t.id,
                category_id: category_id.clone(),
                task_type,
                title: t.title,
                description: t.description,
                instructions: t.instructions,
                time_limit_minutes: t.time_limit_minutes,
                max_score: t.max_score,
                criteria,
                difficulty,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Category {
        id: category_id,
        name: parsed.category.name,
        description: parsed.category.description,
        tasks,
    })
}

/// Recursively load all `.toml` catalog files from a directory.
pub fn load_catalog_directory(dir: &Path) -> Result<Vec<Category>> {
    let mut categories = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            categories.extend(load_catalog_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_category(&path) {
                Ok(category) => categories.push(category),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(categories)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A non-fatal catalog warning.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The task ID (if applicable).
    pub task_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a category for authoring mistakes. Never rejects a category.
pub fn validate_category(category: &Category) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if category.tasks.is_empty() {
        warnings.push(ValidationWarning {
            task_id: None,
            message: "category has no tasks".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for task in &category.tasks {
        if !seen_ids.insert(&task.id) {
            warnings.push(ValidationWarning {
                task_id: Some(task.id.clone()),
                message: format!("duplicate task ID: {}", task.id),
            });
        }
    }

    for task in &category.tasks {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                task_id: Some(task.id.clone()),
                message,
            })
        };

        if task.time_limit_minutes == 0 {
            warn("time limit is zero".into());
        }
        if task.description.trim().is_empty() {
            warn("description is empty".into());
        }
        if task.instructions.is_empty() {
            warn("no instructions provided".into());
        }
        if task.max_score == 0 {
            warn("max_score is zero".into());
        }
        if !task.criteria.is_empty() {
            let total: u32 = task.criteria.iter().map(|c| u32::from(c.weight)).sum();
            if total != 100 {
                warn(format!("criteria weights sum to {total}, not 100"));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[category]
id = "frontend"
name = "Frontend Development"
description = "Build and reason about user interfaces"

[[tasks]]
id = "fe-component"
type = "coding"
title = "Build a dropdown"
description = "Implement an accessible dropdown component."
instructions = ["Support keyboard navigation", "Close on outside click"]
time_limit_minutes = 30
max_score = 100
difficulty = "intermediate"

[[tasks.criteria]]
name = "Correctness"
weight = 60
description = "Behaves as specified"

[[tasks.criteria]]
name = "Accessibility"
weight = 40

[[tasks]]
id = "fe-review"
type = "writing"
title = "Review a pull request"
description = "Write review feedback."
instructions = ["Be specific"]
time_limit_minutes = 15
"#;

    #[test]
    fn parse_valid_toml() {
        let category = parse_category_str(VALID_TOML, &PathBuf::from("fe.toml")).unwrap();
        assert_eq!(category.id, "frontend");
        assert_eq!(category.tasks.len(), 2);
        assert_eq!(category.tasks[0].task_type, TaskType::Coding);
        assert_eq!(category.tasks[0].criteria.len(), 2);
        assert_eq!(category.tasks[1].category_id, "frontend");
        assert_eq!(category.tasks[1].difficulty, Difficulty::Intermediate);
        assert_eq!(category.tasks[1].max_score, 100);
    }

    #[test]
    fn parse_unknown_task_type() {
        let toml = r#"
[category]
id = "x"
name = "X"

[[tasks]]
id = "t"
type = "juggling"
title = "T"
time_limit_minutes = 5
"#;
        let err = parse_category_str(toml, &PathBuf::from("x.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown task type"));
    }

    #[test]
    fn parse_malformed_toml() {
        let result = parse_category_str("[category\nid=", &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn missing_category_is_empty_not_error() {
        let category = parse_category_str(VALID_TOML, &PathBuf::from("fe.toml")).unwrap();
        let catalog = StaticCatalog::new(vec![category]);
        assert!(catalog.tasks_for_category("backend").is_empty());
        let ids: Vec<_> = catalog
            .tasks_for_category("frontend")
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["fe-component", "fe-review"]);
    }

    #[test]
    fn summaries_total_minutes() {
        let category = parse_category_str(VALID_TOML, &PathBuf::from("fe.toml")).unwrap();
        let catalog = StaticCatalog::new(vec![category]);
        let summaries = catalog.categories();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].task_count, 2);
        assert_eq!(summaries[0].total_minutes, 45);
        assert!(catalog.find_task("fe-review").is_some());
    }

    #[test]
    fn validate_flags_weights_and_duplicates() {
        let toml = r#"
[category]
id = "dupes"
name = "Dupes"

[[tasks]]
id = "same"
type = "analysis"
title = "First"
description = "d"
instructions = ["i"]
time_limit_minutes = 10

[[tasks.criteria]]
name = "Depth"
weight = 70

[[tasks]]
id = "same"
type = "design"
title = "Second"
time_limit_minutes = 0
"#;
        let category = parse_category_str(toml, &PathBuf::from("d.toml")).unwrap();
        let warnings = validate_category(&category);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("sum to 70")));
        assert!(warnings.iter().any(|w| w.message.contains("time limit is zero")));
        assert!(warnings.iter().any(|w| w.message.contains("description is empty")));
    }

    #[test]
    fn validate_clean_category() {
        let toml = r#"
[category]
id = "clean"
name = "Clean"

[[tasks]]
id = "t1"
type = "writing"
title = "Essay"
description = "Write it"
instructions = ["One page"]
time_limit_minutes = 10
"#;
        let category = parse_category_str(toml, &PathBuf::from("c.toml")).unwrap();
        assert!(validate_category(&category).is_empty());
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fe.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let categories = load_catalog_directory(dir.path()).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, "frontend");

        let catalog = StaticCatalog::load(dir.path()).unwrap();
        assert_eq!(catalog.all().len(), 1);
    }
}
