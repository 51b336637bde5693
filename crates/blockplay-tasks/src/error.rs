//! Errors raised while building a task.

use thiserror::Error;

/// A maze layout could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("maze layout has no rows")]
    Empty,

    #[error("maze layout has no '{0}' cell")]
    Missing(char),

    #[error("line {line}: more than one '{marker}' cell")]
    Duplicate { marker: char, line: usize },

    #[error("line {line}, column {col}: unknown cell '{ch}' (expected '#', '.', 'S' or 'G')")]
    UnknownCell { ch: char, line: usize, col: usize },

    #[error("line {line}: row is {got} cells wide, expected {expected}")]
    Ragged {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("unknown facing '{0}' (expected N, E, S or W)")]
    BadFacing(String),
}

/// A task could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("unknown task '{0}' (expected 'gradient' or 'maze')")]
    UnknownTask(String),

    #[error(transparent)]
    Maze(#[from] MazeError),
}
