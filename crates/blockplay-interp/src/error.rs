//! Runtime error types for the interpreter.

use thiserror::Error;

use crate::host::HostError;

/// A fault that ends the current run.
///
/// Domain violations and success are not errors; they arrive as
/// [`CallOutcome`](crate::CallOutcome) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A host function failed or was called incorrectly.
    #[error(transparent)]
    Host(#[from] HostError),

    /// `Math.<fn>` called with an unsupported number of arguments.
    #[error("Math.{function} cannot take {got} argument(s)")]
    MathArity { function: &'static str, got: usize },

    /// The run executed more instructions than allowed.
    #[error("instruction limit of {0} exceeded (is there a loop that never ends?)")]
    InstructionLimit(u64),

    /// The operand stack was empty when a value was needed.
    #[error("stack underflow at instruction {0}")]
    StackUnderflow(usize),

    /// A jump or variable slot outside the program.
    #[error("malformed program: {0}")]
    Malformed(String),
}

/// Result alias for interpreter operations.
pub type EvalResult<T> = Result<T, EvalError>;
