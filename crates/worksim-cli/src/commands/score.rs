//! The `worksim score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use worksim_core::scoring::{keywords_for, score_breakdown, SHORT_ANSWER_CHARS};

use super::load_catalog;

pub fn execute(catalog_path: PathBuf, task_id: String, answer_path: PathBuf) -> Result<()> {
    let catalog = load_catalog(&catalog_path)?;
    let task = catalog
        .find_task(&task_id)
        .with_context(|| format!("task '{task_id}' not found in {}", catalog_path.display()))?;
    let answer = std::fs::read_to_string(&answer_path)
        .with_context(|| format!("failed to read answer: {}", answer_path.display()))?;

    let breakdown = score_breakdown(&answer, task);

    println!("Task: {} ({}, {})", task.title, task.id, task.task_type);
    println!("Length: {} chars", breakdown.length_chars);

    if breakdown.short_answer {
        println!("Short answer (under {SHORT_ANSWER_CHARS} chars): scored by length only");
    } else {
        let keyword_total = keywords_for(task.task_type).len();
        let mut table = Table::new();
        table.set_header(vec!["Component", "Points", "Detail"]);
        table.add_row(vec![
            Cell::new("length"),
            Cell::new(format!("{:.1}", breakdown.length)),
            Cell::new(""),
        ]);
        table.add_row(vec![
            Cell::new("keywords"),
            Cell::new(format!("{:.1}", breakdown.keywords)),
            Cell::new(format!(
                "{}/{}: {}",
                breakdown.matched_keywords.len(),
                keyword_total,
                breakdown.matched_keywords.join(", ")
            )),
        ]);
        table.add_row(vec![
            Cell::new("structure"),
            Cell::new(format!("{:.1}", breakdown.structure)),
            Cell::new("blank-line paragraphs"),
        ]);
        table.add_row(vec![
            Cell::new("code fence"),
            Cell::new(format!("{:.1}", breakdown.code_fence)),
            Cell::new("coding tasks only"),
        ]);
        table.add_row(vec![
            Cell::new("list marker"),
            Cell::new(format!("{:.1}", breakdown.list_marker)),
            Cell::new(""),
        ]);
        println!("\n{table}");
    }

    println!("Score: {}", breakdown.total);
    Ok(())
}
