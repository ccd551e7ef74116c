//! The `worksim validate` command.

use std::path::PathBuf;

use anyhow::Result;

use worksim_core::catalog::validate_category;

use super::load_catalog;

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let catalog = load_catalog(&catalog_path)?;

    let mut total_warnings = 0;

    for category in catalog.all() {
        println!("Category: {} ({} tasks)", category.name, category.tasks.len());

        let warnings = validate_category(category);
        for w in &warnings {
            let prefix = w
                .task_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All categories valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
