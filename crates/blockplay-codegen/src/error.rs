//! Codegen error types.

use thiserror::Error;

/// Errors that can occur while lowering a script to instructions.
///
/// The checker rejects everything listed here first, so hitting one of these
/// after a clean check is a bug in the pipeline.
#[derive(Debug, Error, PartialEq)]
pub enum CodegenError {
    /// A variable was used without any `var` declaring it.
    #[error("unresolved symbol: {0}")]
    UnresolvedSymbol(String),

    /// `break` or `continue` with no enclosing loop.
    #[error("'{0}' outside of a loop")]
    OutsideLoop(&'static str),

    /// A `highlightBlock` call without a single string literal argument.
    #[error("invalid highlight marker: {0}")]
    InvalidHighlight(String),

    /// Too many arguments, slots or instructions.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
