//! CLI integration tests using assert_cmd.

use std::io::{Read, Write};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CATALOGS: &str = "../../catalogs";

fn worksim() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("worksim").unwrap();
    cmd.env_remove("WORKSIM_SINK_URL")
        .env_remove("WORKSIM_API_KEY");
    cmd
}

/// Write a config that keeps every output inside `dir`.
fn write_config(dir: &Path, sink: &str) -> std::path::PathBuf {
    let out = dir.join("out");
    let path = dir.join("worksim.toml");
    let content = format!(
        "output_dir = '{}'\njitter_seed = 7\n\n{sink}",
        out.display()
    );
    std::fs::write(&path, content).unwrap();
    path
}

fn file_sink(dir: &Path) -> String {
    format!(
        "[sink]\ntype = \"file\"\ndir = '{}'\n",
        dir.join("subs").display()
    )
}

fn json_files(dir: &Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn validate_catalog_directory() {
    worksim()
        .arg("validate")
        .arg("--catalog")
        .arg(CATALOGS)
        .assert()
        .success()
        .stdout(predicate::str::contains("Frontend Development (3 tasks)"))
        .stdout(predicate::str::contains("Data Analysis (3 tasks)"))
        .stdout(predicate::str::contains("All categories valid"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
[category]
id = "bad"
name = "Bad"

[[tasks]]
id = "t1"
type = "writing"
title = "No time"
description = "Write something"
instructions = ["Go"]
time_limit_minutes = 0
"#,
    )
    .unwrap();

    worksim()
        .arg("validate")
        .arg("--catalog")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[t1] WARNING: time limit is zero"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    worksim()
        .arg("validate")
        .arg("--catalog")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn list_categories_and_tasks() {
    worksim()
        .arg("list")
        .arg("--catalog")
        .arg(CATALOGS)
        .assert()
        .success()
        .stdout(predicate::str::contains("frontend-development"))
        .stdout(predicate::str::contains("data-analysis"));

    worksim()
        .arg("list")
        .arg("--catalog")
        .arg(CATALOGS)
        .arg("--category")
        .arg("data-analysis")
        .assert()
        .success()
        .stdout(predicate::str::contains("da-churn-drivers"))
        .stdout(predicate::str::contains("problem-solving"));
}

#[test]
fn list_unknown_category_fails() {
    worksim()
        .arg("list")
        .arg("--catalog")
        .arg(CATALOGS)
        .arg("--category")
        .arg("astronomy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn score_short_answer() {
    let dir = TempDir::new().unwrap();
    let answer = dir.path().join("answer.txt");
    std::fs::write(&answer, "  fn x  \n").unwrap();

    worksim()
        .arg("score")
        .arg("--catalog")
        .arg(CATALOGS)
        .arg("--task")
        .arg("fe-debounce")
        .arg("--answer")
        .arg(&answer)
        .assert()
        .success()
        .stdout(predicate::str::contains("scored by length only"))
        .stdout(predicate::str::contains("Score: 4"));
}

#[test]
fn score_structured_answer() {
    let dir = TempDir::new().unwrap();
    let answer = dir.path().join("answer.txt");
    let text = format!("{}\n\n- {}", "a".repeat(250), "a".repeat(250));
    std::fs::write(&answer, text).unwrap();

    worksim()
        .arg("score")
        .arg("--catalog")
        .arg(CATALOGS)
        .arg("--task")
        .arg("fe-debounce")
        .arg("--answer")
        .arg(&answer)
        .assert()
        .success()
        .stdout(predicate::str::contains("keywords"))
        .stdout(predicate::str::contains("Score: 50"));
}

#[test]
fn score_unknown_task_fails() {
    let dir = TempDir::new().unwrap();
    let answer = dir.path().join("answer.txt");
    std::fs::write(&answer, "text").unwrap();

    worksim()
        .arg("score")
        .arg("--catalog")
        .arg(CATALOGS)
        .arg("--task")
        .arg("nope")
        .arg("--answer")
        .arg(&answer)
        .assert()
        .failure()
        .stderr(predicate::str::contains("task 'nope' not found"));
}

#[test]
fn run_to_completion_with_file_sink() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &file_sink(dir.path()));

    worksim()
        .arg("run")
        .arg("--catalog")
        .arg(CATALOGS)
        .arg("--category")
        .arg("frontend-development")
        .arg("--candidate-id")
        .arg("cand-42")
        .arg("--config")
        .arg(&config)
        .write_stdin(":status\nUse a timer and clear it on each keystroke.\n:submit\n:skip\n:skip\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1/3: Debounce the search box"))
        .stdout(predicate::str::contains("All tasks complete"))
        .stdout(predicate::str::contains("Finished: completed"))
        .stdout(predicate::str::contains("Submitted: receipt"))
        .stdout(predicate::str::contains("sink reports"));

    let payloads = json_files(&dir.path().join("subs"));
    assert_eq!(payloads.len(), 1);
    let payload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&payloads[0]).unwrap()).unwrap();
    assert_eq!(payload["categoryId"], "frontend-development");
    assert_eq!(payload["candidate"]["id"], "cand-42");
    assert_eq!(payload["taskResults"].as_array().unwrap().len(), 3);
    assert_eq!(payload["taskResults"][1]["score"], 0);

    let reports = json_files(&dir.path().join("out"));
    assert_eq!(reports.len(), 1);
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&reports[0]).unwrap()).unwrap();
    assert_eq!(report["finish_reason"], "completed");
    assert!(report["receipt"]["id"].is_string());
}

#[test]
fn run_quit_leaves_remaining_tasks_unanswered() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &file_sink(dir.path()));

    worksim()
        .arg("run")
        .arg("--catalog")
        .arg(CATALOGS)
        .arg("--category")
        .arg("data-analysis")
        .arg("--config")
        .arg(&config)
        .write_stdin("Churn rose in the EU cohort.\n:quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unanswered"))
        .stdout(predicate::str::contains("Finished: expired"));

    let payloads = json_files(&dir.path().join("subs"));
    let payload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&payloads[0]).unwrap()).unwrap();
    let results = payload["taskResults"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0]["answer"]["text"],
        "Churn rose in the EU cohort."
    );
}

#[test]
fn run_exits_on_expiry_while_stdin_stays_open() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &file_sink(dir.path()));

    let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_worksim"))
        .args(["run", "--catalog", CATALOGS, "--category", "frontend-development"])
        .args(["--time-limit", "2", "--config"])
        .arg(&config)
        .env_remove("WORKSIM_SINK_URL")
        .env_remove("WORKSIM_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    writeln!(stdin, "partial answer").unwrap();

    let start = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if start.elapsed() > Duration::from_secs(15) {
            child.kill().unwrap();
            panic!("worksim kept running after the time budget ran out");
        }
        std::thread::sleep(Duration::from_millis(100));
    };
    assert!(status.success());

    let mut stdout = String::new();
    child.stdout.take().unwrap().read_to_string(&mut stdout).unwrap();
    assert!(stdout.contains("Finished: expired"), "{stdout}");
    drop(stdin);

    let payloads = json_files(&dir.path().join("subs"));
    let payload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&payloads[0]).unwrap()).unwrap();
    assert_eq!(payload["taskResults"][0]["answer"]["text"], "partial answer");
}

#[test]
fn run_with_zero_time_budget_expires_immediately() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &file_sink(dir.path()));

    worksim()
        .arg("run")
        .arg("--catalog")
        .arg(CATALOGS)
        .arg("--category")
        .arg("frontend-development")
        .arg("--time-limit")
        .arg("0")
        .arg("--config")
        .arg(&config)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Finished: expired"));
}

#[test]
fn run_unknown_category_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &file_sink(dir.path()));

    worksim()
        .arg("run")
        .arg("--catalog")
        .arg(CATALOGS)
        .arg("--category")
        .arg("astronomy")
        .arg("--config")
        .arg(&config)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("category 'astronomy' not found"));
}

#[test]
fn run_with_unreachable_sink_keeps_local_report() {
    let dir = TempDir::new().unwrap();
    let sink = "[sink]\ntype = \"http\"\nbase_url = \"http://127.0.0.1:9\"\ntimeout_secs = 2\n";
    let config = write_config(dir.path(), sink);

    worksim()
        .arg("run")
        .arg("--catalog")
        .arg(CATALOGS)
        .arg("--category")
        .arg("frontend-development")
        .arg("--config")
        .arg(&config)
        .write_stdin(":skip\n:skip\n:skip\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not delivered"));

    let reports = json_files(&dir.path().join("out"));
    assert_eq!(reports.len(), 1);
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&reports[0]).unwrap()).unwrap();
    assert!(report["receipt"].is_null());
    assert_eq!(report["submissions"].as_array().unwrap().len(), 3);
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    worksim()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created worksim.toml"))
        .stdout(predicate::str::contains("Created catalogs/example.toml"));

    assert!(dir.path().join("worksim.toml").exists());

    worksim()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));

    worksim()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--catalog")
        .arg("catalogs/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All categories valid"));
}

#[test]
fn help_and_version() {
    worksim()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Timed work simulation runner"));

    worksim()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("worksim"));
}
