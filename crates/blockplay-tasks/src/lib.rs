//! blockplay tasks: the domains scripts act on.
//!
//! Each task owns a small state record and exposes named host functions
//! through [`blockplay_interp::HostFunctions`]:
//!
//! - [`gradient`]: climb toward a hidden peak without walking off the
//!   mountain.
//! - [`maze`]: walk a grid from the start cell to the goal.
//!
//! Mutating functions compute the prospective state, validate it, and only
//! then commit. A refused mutation leaves the state untouched and halts the
//! run with a domain violation.

mod error;
pub mod gradient;
pub mod maze;
mod task;

pub use error::{MazeError, TaskError};
pub use gradient::{GradientSnapshot, GradientState, GradientTask};
pub use maze::{Cell, Facing, MazeGrid, MazeSnapshot, MazeTask};
pub use task::{build_task, Task, TaskKind, TaskSnapshot};
