pub mod init;
pub mod list;
pub mod run;
pub mod score;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use worksim_core::catalog::StaticCatalog;
use worksim_core::model::Task;

/// Load a catalog file or directory, failing on an empty result.
pub fn load_catalog(path: &Path) -> Result<StaticCatalog> {
    let catalog = StaticCatalog::load(path)?;
    anyhow::ensure!(
        !catalog.all().is_empty(),
        "no categories found in {}",
        path.display()
    );
    Ok(catalog)
}

/// `mm:ss`, or `h:mm:ss` past an hour.
pub fn format_secs(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

pub fn print_task(task: &Task, index: usize, total: usize) {
    println!();
    println!("Task {}/{}: {} [{}]", index + 1, total, task.title, task.id);
    println!(
        "  {} / {} / {} min",
        task.task_type, task.difficulty, task.time_limit_minutes
    );
    if !task.description.is_empty() {
        println!();
        for line in task.description.trim().lines() {
            println!("  {line}");
        }
    }
    if !task.instructions.is_empty() {
        println!();
        for (i, step) in task.instructions.iter().enumerate() {
            println!("  {}. {step}", i + 1);
        }
    }
    println!();
}
