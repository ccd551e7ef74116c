//! The `worksim run` command.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use worksim_core::attempt::{Attempt, FinishReason, Step};
use worksim_core::engine::{EngineConfig, SimulationEngine};
use worksim_core::error::EngineError;
use worksim_core::model::{Candidate, InputMode};
use worksim_core::report::AttemptReport;
use worksim_core::timer::TimerState;
use worksim_sink::config::{create_sink, load_config_from};

use super::{format_secs, load_catalog, print_task};

/// What the input loop should do after a line.
#[derive(Debug, PartialEq, Eq)]
enum LineOutcome {
    Continue,
    Finished,
    Quit,
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    catalog_path: Option<PathBuf>,
    category_id: String,
    candidate_id: String,
    candidate_name: String,
    seed: Option<u64>,
    time_limit: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog_path = catalog_path.unwrap_or_else(|| config.catalog_dir.clone());
    let catalog = load_catalog(&catalog_path)?;

    let Some(category) = catalog.category(&category_id) else {
        let known: Vec<&str> = catalog.all().iter().map(|c| c.id.as_str()).collect();
        anyhow::bail!("category '{category_id}' not found. Available: {known:?}");
    };
    let category_name = category.name.clone();

    let sink = create_sink(&config)?;
    let engine_config = EngineConfig {
        time_limit_override_secs: time_limit.or(config.time_limit_secs),
        jitter_seed: seed.or(config.jitter_seed),
        ..EngineConfig::default()
    };
    let engine = SimulationEngine::new(Arc::new(catalog), sink, engine_config);

    let candidate = Candidate {
        id: candidate_id,
        name: candidate_name,
    };
    let Some(handle) = engine.start_shared(&category_id, candidate) else {
        println!("Category '{category_id}' has no tasks, nothing to run.");
        return Ok(());
    };

    {
        let attempt = handle.lock().await;
        eprintln!(
            "worksim v{} — {} ({} tasks, {} total, sink: {})",
            env!("CARGO_PKG_VERSION"),
            category_name,
            attempt.catalog_len(),
            format_secs(attempt.remaining_secs()),
            engine.sink_name(),
        );
        eprintln!("Type your answer, then :submit. Other commands: :skip :code :text :file <name> :pause :resume :status :quit");
        eprintln!("Start a line with :: to enter a literal leading colon.");
        if let Some(task) = attempt.current_task() {
            print_task(task, attempt.task_index(), attempt.catalog_len());
        }
    }

    let mut clock = engine.spawn_clock(Arc::clone(&handle));
    let mut clock_done = false;
    let mut lines = spawn_stdin_reader();

    loop {
        tokio::select! {
            line = lines.recv() => {
                let line = line.transpose().context("failed to read from stdin")?;
                let mut attempt = handle.lock().await;
                let outcome = match line {
                    Some(line) => handle_line(&mut attempt, &line),
                    None => LineOutcome::Quit,
                };
                if outcome == LineOutcome::Quit && attempt.auto_submit_on_expiry() {
                    eprintln!("Attempt ended early; remaining tasks are left unanswered.");
                }
                if outcome != LineOutcome::Continue {
                    break;
                }
            }
            reason = &mut clock, if !clock_done => {
                clock_done = true;
                if let Ok(Some(FinishReason::Expired)) = reason {
                    eprintln!("\nTime is up. Your work in progress was submitted.");
                }
                break;
            }
        }
    }
    if !clock_done {
        clock.abort();
    }

    let outcome = engine.finalize_shared(&handle).await;

    let attempt = handle.lock().await;
    print_summary(&attempt);

    std::fs::create_dir_all(&config.output_dir)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let report_path = config
        .output_dir
        .join(format!("attempt-{timestamp}-{}.json", attempt.id()));
    AttemptReport::from_attempt(&attempt).save_json(&report_path)?;
    eprintln!("Report saved to: {}", report_path.display());

    match outcome {
        Ok(receipt) => {
            println!(
                "Submitted: receipt {} (sink reports {:.1}%)",
                receipt.id, receipt.percentage
            );
            Ok(())
        }
        Err(e) => {
            Err(anyhow::Error::new(e).context("results were saved locally but not delivered"))
        }
    }
}

/// Read stdin lines on a detached thread.
///
/// A blocked read cannot be cancelled, so it must not sit on the runtime's
/// blocking pool, which is drained at shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(64);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Apply one line of input to the attempt.
///
/// Lines starting with `:` are directives; `::` escapes a literal colon.
fn handle_line(attempt: &mut Attempt, line: &str) -> LineOutcome {
    if let Some(literal) = line.strip_prefix("::") {
        attempt.append_line(&format!(":{literal}"));
        return LineOutcome::Continue;
    }
    let Some(directive) = line.strip_prefix(':') else {
        attempt.append_line(line);
        return LineOutcome::Continue;
    };

    let (command, arg) = match directive.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (directive.trim(), ""),
    };

    match command {
        "submit" => {
            let result = attempt.submit_draft();
            step_outcome(attempt, result, "Submitted")
        }
        "skip" => {
            let result = attempt.skip();
            step_outcome(attempt, result, "Skipped")
        }
        "code" => {
            attempt.set_input_mode(InputMode::Code);
            println!("Input mode: code");
            LineOutcome::Continue
        }
        "text" => {
            attempt.set_input_mode(InputMode::Text);
            println!("Input mode: text");
            LineOutcome::Continue
        }
        "file" if !arg.is_empty() => {
            attempt.attach_file(arg);
            println!("Attached: {arg}");
            LineOutcome::Continue
        }
        "file" => {
            eprintln!("Usage: :file <name>");
            LineOutcome::Continue
        }
        "pause" => {
            if attempt.pause() {
                println!("Paused at {} remaining.", format_secs(attempt.remaining_secs()));
            }
            LineOutcome::Continue
        }
        "resume" => {
            if attempt.resume() {
                println!("Resumed.");
            }
            LineOutcome::Continue
        }
        "status" => {
            let p = attempt.progress();
            let timer = match p.timer {
                TimerState::Running => "running",
                TimerState::Paused => "paused",
                TimerState::Expired => "expired",
                TimerState::Stopped => "stopped",
            };
            println!(
                "Task {}/{}, {} submitted, {} remaining ({timer})",
                (p.task_index + 1).min(p.total_tasks),
                p.total_tasks,
                p.submitted,
                format_secs(p.remaining_secs),
            );
            LineOutcome::Continue
        }
        "quit" => LineOutcome::Quit,
        other => {
            eprintln!("Unknown command: :{other}");
            LineOutcome::Continue
        }
    }
}

fn step_outcome(attempt: &Attempt, result: Result<Step, EngineError>, verb: &str) -> LineOutcome {
    match result {
        Ok(Step::Next { task_index }) => {
            println!("{verb}.");
            if let Some(task) = attempt.tasks().get(task_index) {
                print_task(task, task_index, attempt.catalog_len());
            }
            LineOutcome::Continue
        }
        Ok(Step::Finished(_)) => {
            println!("{verb}. All tasks complete.");
            LineOutcome::Finished
        }
        Err(EngineError::ExpiryRace { .. }) => LineOutcome::Finished,
        Err(e) => {
            eprintln!("{e}");
            LineOutcome::Continue
        }
    }
}

fn print_summary(attempt: &Attempt) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Task", "Type", "Score", "Time", "Status"]);

    for (i, task) in attempt.tasks().iter().enumerate() {
        let row = match attempt.submissions().get(i) {
            Some(sub) => {
                let status = if sub.skipped {
                    "skipped"
                } else if sub.auto_submitted {
                    "auto-submitted"
                } else {
                    "submitted"
                };
                vec![
                    Cell::new(&task.id),
                    Cell::new(task.task_type),
                    Cell::new(sub.score),
                    Cell::new(format_secs(sub.time_spent_secs)),
                    Cell::new(status),
                ]
            }
            None => vec![
                Cell::new(&task.id),
                Cell::new(task.task_type),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("unanswered"),
            ],
        };
        table.add_row(row);
    }

    println!("\n{table}");

    if let Some(reason) = attempt.finish_reason() {
        println!("Finished: {reason}");
    }
    if let Some(score) = attempt.score() {
        let b = score.breakdown;
        println!("Average score: {}", score.average_score);
        println!(
            "Breakdown: technical {}, creativity {}, efficiency {}, communication {}",
            b.technical, b.creativity, b.efficiency, b.communication
        );
    }
}
