//! The `worksim init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("worksim.toml").exists() {
        println!("worksim.toml already exists, skipping.");
    } else {
        std::fs::write("worksim.toml", SAMPLE_CONFIG)?;
        println!("Created worksim.toml");
    }

    std::fs::create_dir_all("catalogs")?;
    let example_path = Path::new("catalogs/example.toml");
    if example_path.exists() {
        println!("catalogs/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CATALOG)?;
        println!("Created catalogs/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point [sink] at your backend in worksim.toml (or keep the file sink)");
    println!("  2. Run: worksim validate --catalog catalogs/example.toml");
    println!("  3. Run: worksim run --catalog catalogs/example.toml --category example");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# worksim configuration

catalog_dir = "./catalogs"
output_dir = "./worksim-results"
# jitter_seed = 42
# time_limit_secs = 3600

[sink]
type = "file"
dir = "./worksim-results/submissions"

# [sink]
# type = "http"
# base_url = "https://api.example.com"
# api_key = "${WORKSIM_API_KEY}"
"#;

const EXAMPLE_CATALOG: &str = r#"[category]
id = "example"
name = "Example Simulation"
description = "A short two-task simulation to get started"

[[tasks]]
id = "example-bugfix"
type = "coding"
title = "Fix the off-by-one"
description = """
A pagination helper returns one item too few on the last page.
Explain the bug and write a corrected version.
"""
instructions = [
    "Identify the faulty boundary check",
    "Write the corrected function",
    "Describe one edge case your fix covers",
]
time_limit_minutes = 15
difficulty = "beginner"

[[tasks.criteria]]
name = "Correctness"
weight = 60

[[tasks.criteria]]
name = "Explanation"
weight = 40

[[tasks]]
id = "example-update"
type = "writing"
title = "Write the release note"
description = "Summarize the fix for a non-technical audience."
instructions = [
    "Keep it under 150 words",
    "Say who is affected and what changes for them",
]
time_limit_minutes = 10
difficulty = "beginner"
"#;
