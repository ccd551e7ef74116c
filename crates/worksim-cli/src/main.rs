//! worksim CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::{Directive, LevelFilter};

mod commands;

#[derive(Parser)]
#[command(name = "worksim", version, about = "Timed work simulation runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a timed simulation, reading answers from stdin
    Run {
        /// Path to a category .toml file or catalog directory
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Category to run
        #[arg(long)]
        category: String,

        /// Candidate identifier passed to the sink
        #[arg(long, default_value = "anonymous")]
        candidate_id: String,

        /// Candidate display name
        #[arg(long, default_value = "")]
        candidate_name: String,

        /// Seed for score jitter
        #[arg(long)]
        seed: Option<u64>,

        /// Total time budget in seconds (default: sum of task limits)
        #[arg(long)]
        time_limit: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score an answer file against a task and show the breakdown
    Score {
        /// Path to a category .toml file or catalog directory
        #[arg(long)]
        catalog: PathBuf,

        /// Task ID
        #[arg(long)]
        task: String,

        /// File containing the answer text
        #[arg(long)]
        answer: PathBuf,
    },

    /// List categories, or the tasks of one category
    List {
        /// Path to a category .toml file or catalog directory
        #[arg(long)]
        catalog: PathBuf,

        /// Show the tasks of this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Validate catalog TOML files
    Validate {
        /// Path to a category .toml file or catalog directory
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Create starter config and example catalog
    Init,
}

#[tokio::main]
async fn main() {
    let directive: Directive = "worksim=info"
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            catalog,
            category,
            candidate_id,
            candidate_name,
            seed,
            time_limit,
            config,
        } => {
            commands::run::execute(
                catalog,
                category,
                candidate_id,
                candidate_name,
                seed,
                time_limit,
                config,
            )
            .await
        }
        Commands::Score {
            catalog,
            task,
            answer,
        } => commands::score::execute(catalog, task, answer),
        Commands::List { catalog, category } => commands::list::execute(catalog, category),
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
