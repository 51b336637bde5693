//! The instruction machine: executes a [`Program`] one instruction at a time.

use std::cmp::Ordering;
use std::sync::Arc;

use blockplay_codegen::{Instr, Program};
use blockplay_types::ast::BinOp;
use blockplay_types::{Span, Value};

use crate::error::{EvalError, EvalResult};
use crate::host::{CallOutcome, HostFunctions};

/// A halting outcome signalled by a host function.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    DomainViolation(String),
    Success(String),
}

/// What one executed instruction produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Nothing observable; keep going.
    Continue,
    /// A highlight marker ran.
    Highlight(String),
    /// A host function halted the run.
    Signal(Signal),
    /// The program has no more instructions.
    End,
}

/// Execution state of one run of a program.
#[derive(Debug, Clone)]
pub struct Machine {
    program: Arc<Program>,
    pc: usize,
    stack: Vec<Value>,
    globals: Vec<Value>,
    executed: u64,
    max_instructions: u64,
}

impl Machine {
    /// Fresh machine at the start of `program` with every variable undefined.
    pub fn new(program: Arc<Program>, max_instructions: u64) -> Self {
        let globals = vec![Value::Undefined; program.slots.len()];
        Self {
            program,
            pc: 0,
            stack: Vec::with_capacity(16),
            globals,
            executed: 0,
            max_instructions,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Index of the next instruction.
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Instructions executed so far.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Current value of a script variable.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        let slot = self.program.slot_of(name)?;
        self.globals.get(slot as usize)
    }

    /// Source position of the instruction at `pc`.
    pub fn span_at(&self, pc: usize) -> Option<Span> {
        self.program.source_map.lookup(pc as u32)
    }

    /// Execute the next instruction.
    pub fn step<H: HostFunctions + ?Sized>(&mut self, host: &mut H) -> EvalResult<Step> {
        let Some(instr) = self.program.instrs.get(self.pc) else {
            return Ok(Step::End);
        };
        if self.executed >= self.max_instructions {
            return Err(EvalError::InstructionLimit(self.max_instructions));
        }
        self.executed += 1;

        // cloned so the program borrow ends before the stack is mutated
        let instr = instr.clone();
        let mut next = self.pc + 1;
        let mut step = Step::Continue;

        match instr {
            Instr::Push(v) => self.stack.push(v),
            Instr::Load(slot) => {
                let v = self
                    .globals
                    .get(slot as usize)
                    .cloned()
                    .ok_or_else(|| bad_slot(slot))?;
                self.stack.push(v);
            }
            Instr::Store(slot) => {
                let v = self.pop()?;
                *self.globals.get_mut(slot as usize).ok_or_else(|| bad_slot(slot))? = v;
            }
            Instr::Pop => {
                self.pop()?;
            }
            Instr::Neg => {
                let v = self.pop()?;
                self.stack.push(Value::Number(-v.to_number()));
            }
            Instr::Not => {
                let v = self.pop()?;
                self.stack.push(Value::Bool(!v.is_truthy()));
            }
            Instr::ToNumber => {
                let v = self.pop()?;
                self.stack.push(Value::Number(v.to_number()));
            }
            Instr::Binary(op) => {
                let right = self.pop()?;
                let left = self.pop()?;
                self.stack.push(binary(op, &left, &right));
            }
            Instr::Jump(t) => next = self.target(t)?,
            Instr::JumpIfFalse(t) => {
                if !self.pop()?.is_truthy() {
                    next = self.target(t)?;
                }
            }
            Instr::JumpIfFalseKeep(t) => {
                if self.peek()?.is_truthy() {
                    self.pop()?;
                } else {
                    next = self.target(t)?;
                }
            }
            Instr::JumpIfTrueKeep(t) => {
                if self.peek()?.is_truthy() {
                    next = self.target(t)?;
                } else {
                    self.pop()?;
                }
            }
            Instr::CallHost { name, argc } => {
                let args = self.pop_args(argc)?;
                tracing::debug!(function = %name, ?args, "host call");
                match host.call(&name, &args)? {
                    CallOutcome::Continue(v) => self.stack.push(v),
                    CallOutcome::DomainViolation(msg) => {
                        step = Step::Signal(Signal::DomainViolation(msg))
                    }
                    CallOutcome::Success(msg) => step = Step::Signal(Signal::Success(msg)),
                }
            }
            Instr::CallMath { function, argc } => {
                let args = self.pop_args(argc)?;
                let (min, max) = function.arity();
                if args.len() < min || args.len() > max {
                    return Err(EvalError::MathArity {
                        function: function.name(),
                        got: args.len(),
                    });
                }
                let nums: Vec<f64> = args.iter().map(Value::to_number).collect();
                self.stack.push(Value::Number(function.apply(&nums)));
            }
            Instr::Highlight(id) => step = Step::Highlight(id),
        }

        self.pc = next;
        Ok(step)
    }

    // ── Stack helpers ────────────────────────────────────────────────────

    fn pop(&mut self) -> EvalResult<Value> {
        self.stack.pop().ok_or(EvalError::StackUnderflow(self.pc))
    }

    fn peek(&self) -> EvalResult<&Value> {
        self.stack.last().ok_or(EvalError::StackUnderflow(self.pc))
    }

    fn pop_args(&mut self, argc: u8) -> EvalResult<Vec<Value>> {
        let argc = argc as usize;
        if self.stack.len() < argc {
            return Err(EvalError::StackUnderflow(self.pc));
        }
        Ok(self.stack.split_off(self.stack.len() - argc))
    }

    fn target(&self, t: u32) -> EvalResult<usize> {
        let t = t as usize;
        if t > self.program.instrs.len() {
            return Err(EvalError::Malformed(format!(
                "jump to {t} past the end of the program"
            )));
        }
        Ok(t)
    }
}

fn bad_slot(slot: u32) -> EvalError {
    EvalError::Malformed(format!("no variable slot {slot}"))
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

/// Apply a binary operator with JavaScript semantics.
pub fn binary(op: BinOp, left: &Value, right: &Value) -> Value {
    match op {
        BinOp::Add => match (left, right) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!("{left}{right}")),
            _ => Value::Number(left.to_number() + right.to_number()),
        },
        BinOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinOp::Div => Value::Number(left.to_number() / right.to_number()),
        // f64 `%` keeps the sign of the dividend, like JS
        BinOp::Mod => Value::Number(left.to_number() % right.to_number()),
        BinOp::Eq => Value::Bool(left.loose_eq(right)),
        BinOp::NotEq => Value::Bool(!left.loose_eq(right)),
        BinOp::StrictEq => Value::Bool(left.strict_eq(right)),
        BinOp::StrictNotEq => Value::Bool(!left.strict_eq(right)),
        BinOp::Less => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinOp::LessEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinOp::Greater => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinOp::GreaterEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
    }
}

/// Strings compare lexicographically, anything else numerically; `None`
/// when either side is `NaN`.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}
