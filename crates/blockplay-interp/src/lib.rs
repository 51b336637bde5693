//! blockplay interpreter: executes compiled scripts one block at a time.
//!
//! The [`Interpreter`] owns the run state machine (Idle, Running, Halted)
//! and a [`Machine`] for the active run. Each [`Interpreter::tick`] runs
//! instructions until the next highlight marker, so a timer-driven host can
//! animate execution block by block. Tasks plug in through the
//! [`HostFunctions`] trait.

mod error;
mod host;
mod interpreter;
mod machine;

pub use error::{EvalError, EvalResult};
pub use host::{expect_args, number_arg, CallOutcome, HostError, HostFunctions};
pub use interpreter::{
    Halt, Interpreter, Limits, RunState, StartOutcome, TickReport, DEFAULT_MAX_INSTRUCTIONS,
    DEFAULT_TICK_BUDGET,
};
pub use machine::{binary, Machine, Signal, Step};
