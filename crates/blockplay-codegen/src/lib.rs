//! blockplay code generator: compiles a checked script AST into a flat
//! instruction [`Program`] for the stepped interpreter.
//!
//! # Architecture
//!
//! Every script variable is hoisted into a global slot, as `var` is in the
//! scripts the block editor emits. Control flow lowers to absolute jumps.
//! The block editor's `highlightBlock('id')` calls become
//! [`Instr::Highlight`] markers, which is where the interpreter ends a tick.
//!
//! ## Stack discipline
//!
//! Expressions leave exactly one [`Value`](blockplay_types::Value) on the
//! operand stack; statements leave the stack as they found it.

pub mod compiler;
pub mod error;
mod expr;
pub mod instr;
pub mod source_map;
mod stmt;

pub use compiler::{compile, Program};
pub use error::{CodegenError, CodegenResult};
pub use instr::Instr;
pub use source_map::{SourceMap, SourceMapEntry};
