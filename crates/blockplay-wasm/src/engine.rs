//! Platform-independent playground state behind the WASM bindings.

use blockplay_interp::{Halt, Interpreter, Limits, RunState, StartOutcome, TickReport};
use blockplay_tasks::{build_task, Task, TaskError, TaskKind, TaskSnapshot};
use blockplay_types::CompileErrors;
use serde::Serialize;

/// Script name used in diagnostics.
pub const SCRIPT_NAME: &str = "workspace.js";

pub const DEFAULT_INTERVAL_MS: u32 = 500;

/// Result of [`Engine::start`].
#[derive(Debug, Clone, Serialize)]
pub struct StartView {
    pub started: bool,
    pub already_running: bool,
    pub errors: CompileErrors,
}

/// Result of [`Engine::tick`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickView {
    Idle,
    Stepped { block: Option<String> },
    Halted { halt: Halt },
    Finished,
}

impl From<TickReport> for TickView {
    fn from(report: TickReport) -> Self {
        match report {
            TickReport::Idle => TickView::Idle,
            TickReport::Stepped { block } => TickView::Stepped { block },
            TickReport::Halted(halt) => TickView::Halted { halt },
            TickReport::Finished => TickView::Finished,
        }
    }
}

/// One task and one interpreter, ticked by the host's own timer.
pub struct Engine {
    interp: Interpreter,
    task: Box<dyn Task>,
    interval_ms: u32,
}

impl Engine {
    pub fn new(kind: TaskKind, seed: u64, maze: Option<&str>) -> Result<Self, TaskError> {
        Ok(Self {
            interp: Interpreter::new(Limits::default()),
            task: build_task(kind, seed, maze)?,
            interval_ms: DEFAULT_INTERVAL_MS,
        })
    }

    pub fn kind(&self) -> TaskKind {
        self.task.kind()
    }

    /// Compile and start `source`. Ignored while a run is in progress.
    pub fn start(&mut self, source: &str) -> StartView {
        if self.interp.is_running() {
            return StartView {
                started: false,
                already_running: true,
                errors: CompileErrors::empty(),
            };
        }
        match blockplay_compiler::compile(source, SCRIPT_NAME, self.task.signatures()) {
            Ok(program) => {
                self.task.begin_run();
                let outcome = self.interp.start(program);
                StartView {
                    started: outcome == StartOutcome::Started,
                    already_running: false,
                    errors: CompileErrors::empty(),
                }
            }
            Err(errors) => StartView {
                started: false,
                already_running: false,
                errors,
            },
        }
    }

    pub fn tick(&mut self) -> TickView {
        self.interp.tick(&mut self.task).into()
    }

    pub fn stop(&mut self) {
        self.interp.stop();
    }

    /// Stop, then restore the task's initial state.
    pub fn reset(&mut self) {
        self.interp.stop();
        self.task.reset();
    }

    /// Stop, reset, and pick a new hidden target.
    pub fn new_target(&mut self) {
        self.reset();
        self.task.new_target();
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.task.snapshot()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.interp.highlighted()
    }

    pub fn state(&self) -> &RunState {
        self.interp.state()
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// The host reads this before scheduling each tick.
    pub fn set_interval_ms(&mut self, ms: u32) {
        self.interval_ms = ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_reports_compile_errors() {
        let mut engine = Engine::new(TaskKind::Gradient, 1, None).unwrap();
        let view = engine.start("grad_update_x();");
        assert!(!view.started);
        assert_eq!(view.errors.total_errors, 1);
        assert_eq!(engine.state(), &RunState::Idle);
    }

    #[test]
    fn ticks_step_through_blocks() {
        let mut engine = Engine::new(TaskKind::Maze, 0, None).unwrap();
        let view = engine.start("highlightBlock('m');\nmaze_move_forward();");
        assert!(view.started);

        assert_eq!(
            engine.tick(),
            TickView::Stepped {
                block: Some("m".into())
            }
        );
        assert_eq!(engine.highlighted(), Some("m"));
        assert!(engine.start("maze_turn_left();").already_running);
        assert_eq!(engine.tick(), TickView::Finished);
        assert_eq!(engine.tick(), TickView::Idle);
    }

    #[test]
    fn reset_stops_and_restores() {
        let mut engine = Engine::new(TaskKind::Maze, 0, None).unwrap();
        let _ = engine.start("while (true) {\n  highlightBlock('t');\n  maze_turn_left();\n}");
        engine.tick();
        engine.tick();
        engine.reset();
        assert_eq!(engine.state(), &RunState::Idle);
        assert_eq!(engine.highlighted(), None);
        let fresh = Engine::new(TaskKind::Maze, 0, None).unwrap();
        assert_eq!(engine.snapshot(), fresh.snapshot());
    }

    #[test]
    fn tick_view_serializes_with_a_kind_tag() {
        let view = TickView::Halted {
            halt: Halt::Success("reached the goal".into()),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["kind"], "halted");
        assert_eq!(json["halt"]["kind"], "success");
        assert_eq!(json["halt"]["message"], "reached the goal");
    }
}
