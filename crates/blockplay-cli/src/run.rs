//! `blockplay run`

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use blockplay_interp::Halt;
use blockplay_runtime::{ExecutionEvent, RunConfig, Session};
use blockplay_tasks::{TaskKind, TaskSnapshot};

/// Command-line values that take precedence over the config file.
pub struct Overrides {
    pub task: Option<TaskKind>,
    pub interval_ms: Option<u64>,
    pub seed: Option<u64>,
    pub maze: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut RunConfig) {
        if let Some(task) = self.task {
            config.task = task;
        }
        if let Some(ms) = self.interval_ms {
            config.interval_ms = ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.maze.is_some() {
            config.maze = self.maze;
        }
    }
}

pub async fn execute(
    script: &Path,
    config_path: Option<&Path>,
    overrides: Overrides,
    json: bool,
) -> Result<ExitCode> {
    let mut config = match config_path {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    overrides.apply(&mut config);

    let source = std::fs::read_to_string(script)
        .with_context(|| format!("failed to read script '{}'", script.display()))?;
    let name = script.display().to_string();

    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(task = %config.task, seed, interval_ms = config.interval_ms, "session configured");
    let (session, mut events) = Session::from_config(&config, seed)?;

    print_snapshot(&session.snapshot(), "start", json)?;
    let _started = session.start(&name, &source)?;

    let code = loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break ExitCode::FAILURE;
                };
                match event {
                    ExecutionEvent::Highlight(block) => {
                        print_snapshot(&session.snapshot(), &block, json)?;
                    }
                    ExecutionEvent::Halted(halt) => {
                        print_snapshot(&session.snapshot(), "halt", json)?;
                        break report_halt(&halt);
                    }
                    ExecutionEvent::Finished => {
                        print_snapshot(&session.snapshot(), "end", json)?;
                        println!("script finished without solving the task");
                        break ExitCode::SUCCESS;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.stop();
                println!("stopped");
                break ExitCode::from(130);
            }
        }
    };
    Ok(code)
}

fn report_halt(halt: &Halt) -> ExitCode {
    match halt {
        Halt::Success(message) => {
            println!("success: {message}");
            ExitCode::SUCCESS
        }
        Halt::DomainViolation(message) => {
            println!("stopped: {message}");
            ExitCode::from(1)
        }
        Halt::Fault(message) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
    }
}

fn print_snapshot(snapshot: &TaskSnapshot, label: &str, json: bool) -> Result<()> {
    if json {
        let mut value = serde_json::to_value(snapshot)?;
        value["step"] = label.into();
        println!("{value}");
        return Ok(());
    }
    println!("[{label:>8}] {}", describe(snapshot));
    Ok(())
}

fn describe(snapshot: &TaskSnapshot) -> String {
    match snapshot {
        TaskSnapshot::Gradient(g) => format!(
            "x = {:.3}, y = {:.3}, height = {:.3}",
            g.state.x, g.state.y, g.height
        ),
        TaskSnapshot::Maze(m) => format!(
            "row {}, col {}, facing {}",
            m.player.row, m.player.col, m.facing
        ),
    }
}
