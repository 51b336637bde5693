//! blockplay: check block-editor scripts and watch them play a task.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use blockplay_tasks::TaskKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod check;
mod run;

/// Block-programming playground runner
#[derive(Parser)]
#[command(name = "blockplay")]
#[command(about = "Check block-editor scripts and run them against a task", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script step by step against a task
    ///
    /// Prints every highlighted block with the task state, and exits when the
    /// script halts or finishes. Ctrl-C stops the run.
    Run {
        /// Script file produced by the block editor
        script: PathBuf,

        /// TOML run configuration; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Task to play: gradient or maze
        #[arg(long)]
        task: Option<TaskKind>,

        /// Milliseconds between steps
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Seed for the hidden target
        #[arg(long)]
        seed: Option<u64>,

        /// Maze layout file
        #[arg(long)]
        maze: Option<PathBuf>,

        /// Print task snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Compile a script and report diagnostics without running it
    Check {
        /// Script file produced by the block editor
        script: PathBuf,

        /// Task whose functions the script may call
        #[arg(long, default_value = "gradient")]
        task: TaskKind,

        /// Print the compiled instruction listing
        #[arg(long)]
        listing: bool,
    },

    /// List the functions a task exposes to scripts
    Functions {
        #[arg(long, default_value = "gradient")]
        task: TaskKind,

        /// Print as a JSON table
        #[arg(long)]
        json: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            script,
            config,
            task,
            interval_ms,
            seed,
            maze,
            json,
        } => {
            let overrides = run::Overrides {
                task,
                interval_ms,
                seed,
                maze,
            };
            run::execute(&script, config.as_deref(), overrides, json).await
        }
        Commands::Check {
            script,
            task,
            listing,
        } => check::execute(&script, task, listing),
        Commands::Functions { task, json } => {
            if json {
                println!(
                    "{}",
                    blockplay_compiler::reference::generate_function_table(task.signatures())
                );
            } else {
                print!(
                    "{}",
                    blockplay_compiler::reference::generate_reference(task.name(), task.signatures())
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
