//! The `worksim list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use worksim_core::catalog::TaskCatalog;

use super::load_catalog;

pub fn execute(catalog_path: PathBuf, category: Option<String>) -> Result<()> {
    let catalog = load_catalog(&catalog_path)?;

    let mut table = Table::new();
    match category {
        Some(id) => {
            let Some(category) = catalog.category(&id) else {
                anyhow::bail!("category '{id}' not found");
            };
            println!("{} ({} tasks)", category.name, category.tasks.len());
            table.set_header(vec!["ID", "Type", "Difficulty", "Minutes", "Title"]);
            for task in &category.tasks {
                table.add_row(vec![
                    Cell::new(&task.id),
                    Cell::new(task.task_type),
                    Cell::new(task.difficulty),
                    Cell::new(task.time_limit_minutes),
                    Cell::new(&task.title),
                ]);
            }
        }
        None => {
            table.set_header(vec!["ID", "Name", "Tasks", "Minutes"]);
            for summary in catalog.categories() {
                table.add_row(vec![
                    Cell::new(summary.id),
                    Cell::new(summary.name),
                    Cell::new(summary.task_count),
                    Cell::new(summary.total_minutes),
                ]);
            }
        }
    }

    println!("{table}");
    Ok(())
}
