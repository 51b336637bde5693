//! blockplay parser: converts a token stream into a [`Script`] AST.
//!
//! [`Script`]: blockplay_types::ast::Script

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser};
