//! The instruction set executed by the stepped interpreter.

use std::fmt;

use blockplay_types::ast::BinOp;
use blockplay_types::{MathFn, Value};

/// Index of a hoisted script variable.
pub type Slot = u32;

/// Absolute instruction index used by jumps.
pub type Target = u32;

/// One instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// Push a constant.
    Push(Value),
    /// Push the value of a variable.
    Load(Slot),
    /// Pop into a variable.
    Store(Slot),
    /// Discard the top of the stack.
    Pop,

    // ── Operators ──
    Neg,
    Not,
    /// Unary `+`.
    ToNumber,
    Binary(BinOp),

    // ── Control flow ──
    Jump(Target),
    /// Pop; jump when falsy.
    JumpIfFalse(Target),
    /// `&&`: when the top is falsy jump and keep it, otherwise pop it.
    JumpIfFalseKeep(Target),
    /// `||`: when the top is truthy jump and keep it, otherwise pop it.
    JumpIfTrueKeep(Target),

    // ── Calls ──
    /// Pop `argc` arguments, call a task host function, push its result.
    CallHost { name: String, argc: u8 },
    /// Pop `argc` arguments, apply a `Math` function, push the result.
    CallMath { function: MathFn, argc: u8 },

    /// Report a block as the one executing. Ends the current tick.
    Highlight(String),
}

impl Instr {
    /// Jump target, if this is a jump.
    pub fn target(&self) -> Option<Target> {
        match self {
            Instr::Jump(t)
            | Instr::JumpIfFalse(t)
            | Instr::JumpIfFalseKeep(t)
            | Instr::JumpIfTrueKeep(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Push(Value::Str(s)) => write!(f, "push {s:?}"),
            Instr::Push(v) => write!(f, "push {v}"),
            Instr::Load(slot) => write!(f, "load ${slot}"),
            Instr::Store(slot) => write!(f, "store ${slot}"),
            Instr::Pop => write!(f, "pop"),
            Instr::Neg => write!(f, "neg"),
            Instr::Not => write!(f, "not"),
            Instr::ToNumber => write!(f, "tonumber"),
            Instr::Binary(op) => write!(f, "binary {}", op.symbol()),
            Instr::Jump(t) => write!(f, "jump @{t}"),
            Instr::JumpIfFalse(t) => write!(f, "jump_if_false @{t}"),
            Instr::JumpIfFalseKeep(t) => write!(f, "and @{t}"),
            Instr::JumpIfTrueKeep(t) => write!(f, "or @{t}"),
            Instr::CallHost { name, argc } => write!(f, "call {name}/{argc}"),
            Instr::CallMath { function, argc } => write!(f, "math {}/{argc}", function.name()),
            Instr::Highlight(id) => write!(f, "highlight {id:?}"),
        }
    }
}
