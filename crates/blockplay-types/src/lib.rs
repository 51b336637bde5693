//! Shared types for the blockplay script pipeline.
//!
//! Defines the AST produced by the parser, source spans, runtime values,
//! the `Math` builtin table, host function signatures and the structured
//! diagnostics every compiler stage reports into.

mod builtins;
mod error;
mod signature;
mod span;
mod value;
pub mod ast;

pub use builtins::{MathConst, MathFn};
pub use error::{CompileErrors, ErrorCategory, ErrorCode, ScriptError, MAX_ERRORS};
pub use signature::{lookup_signature, FunctionKind, FunctionSig};
pub use span::{SourceFile, Span};
pub use value::Value;

/// Name of the call the block editor inserts before every statement block.
pub const HIGHLIGHT_FUNCTION: &str = "highlightBlock";
