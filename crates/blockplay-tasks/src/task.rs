//! The `Task` trait and task selection.

use std::fmt;
use std::str::FromStr;

use blockplay_interp::HostFunctions;
use blockplay_types::FunctionSig;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;
use crate::gradient::{self, GradientSnapshot, GradientTask};
use crate::maze::{self, MazeGrid, MazeSnapshot, MazeTask};

/// A task domain: live state plus the host functions scripts call on it.
///
/// Implementations validate every mutation before committing it and route
/// each committed mutation through one post-mutation check, which reports
/// success at most once per run.
pub trait Task: HostFunctions + Send {
    fn kind(&self) -> TaskKind;

    /// Host functions scripts may call.
    fn signatures(&self) -> &'static [FunctionSig] {
        self.kind().signatures()
    }

    /// Called when a run starts. Re-arms the success report.
    fn begin_run(&mut self);

    /// Restore the initial state.
    fn reset(&mut self);

    /// Pick a new hidden target, for tasks that have one.
    fn new_target(&mut self) {}

    /// A serializable view for rendering.
    fn snapshot(&self) -> TaskSnapshot;
}

impl<T: Task + ?Sized> Task for Box<T> {
    fn kind(&self) -> TaskKind {
        (**self).kind()
    }

    fn signatures(&self) -> &'static [FunctionSig] {
        (**self).signatures()
    }

    fn begin_run(&mut self) {
        (**self).begin_run()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn new_target(&mut self) {
        (**self).new_target()
    }

    fn snapshot(&self) -> TaskSnapshot {
        (**self).snapshot()
    }
}

/// Which task to play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    #[default]
    Gradient,
    Maze,
}

impl TaskKind {
    pub const ALL: [TaskKind; 2] = [TaskKind::Gradient, TaskKind::Maze];

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Gradient => "gradient",
            TaskKind::Maze => "maze",
        }
    }

    pub fn signatures(self) -> &'static [FunctionSig] {
        match self {
            TaskKind::Gradient => gradient::FUNCTIONS,
            TaskKind::Maze => maze::FUNCTIONS,
        }
    }
}

impl FromStr for TaskKind {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TaskError::UnknownTask(s.to_string()))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rendering view of any task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "task", rename_all = "lowercase")]
pub enum TaskSnapshot {
    Gradient(GradientSnapshot),
    Maze(MazeSnapshot),
}

/// Build a task. `seed` draws the gradient target; `maze` is a layout in
/// [`MazeGrid::parse`] format, the built-in layout when `None`.
pub fn build_task(kind: TaskKind, seed: u64, maze: Option<&str>) -> Result<Box<dyn Task>, TaskError> {
    let task: Box<dyn Task> = match kind {
        TaskKind::Gradient => Box::new(GradientTask::new(seed)),
        TaskKind::Maze => {
            let grid = match maze {
                Some(text) => MazeGrid::parse(text)?,
                None => MazeGrid::default(),
            };
            Box::new(MazeTask::new(grid))
        }
    };
    tracing::debug!(task = %kind, "task created");
    Ok(task)
}
