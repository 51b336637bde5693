//! Program assembler.
//!
//! Orchestrates code generation:
//! 1. Hoist every `var` into a global slot, in declaration order
//! 2. Emit statements, patching forward jumps as their targets appear
//! 3. Record a source map entry per statement and per call

use std::collections::HashMap;
use std::fmt::Write as _;

use blockplay_types::ast::*;
use blockplay_types::{Span, Value};

use crate::error::{CodegenError, CodegenResult};
use crate::instr::{Instr, Slot, Target};
use crate::source_map::SourceMap;
use crate::stmt::emit_stmts;

/// Upper bound on emitted instructions.
pub const MAX_PROGRAM_LEN: usize = 1 << 20;

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// A compiled script, ready for the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Script name, used in diagnostics.
    pub name: String,
    pub instrs: Vec<Instr>,
    /// Variable names, indexed by slot.
    pub slots: Vec<String>,
    pub source_map: SourceMap,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn slot_of(&self, name: &str) -> Option<Slot> {
        self.slots.iter().position(|s| s == name).map(|i| i as Slot)
    }

    /// Block ids in the order their highlight markers appear.
    pub fn highlight_ids(&self) -> impl Iterator<Item = &str> {
        self.instrs.iter().filter_map(|i| match i {
            Instr::Highlight(id) => Some(id.as_str()),
            _ => None,
        })
    }

    /// Human-readable listing, one instruction per line.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "; {}", self.name);
        for (i, name) in self.slots.iter().enumerate() {
            let _ = writeln!(out, "; ${i} = {name}");
        }
        for (pc, instr) in self.instrs.iter().enumerate() {
            let text = instr.to_string();
            match self.source_map.lookup(pc as u32) {
                Some(span) => {
                    let _ = writeln!(out, "{pc:>5}  {text:<32} ; {span}");
                }
                None => {
                    let _ = writeln!(out, "{pc:>5}  {text}");
                }
            }
        }
        out
    }
}

/// Compile a checked [`Script`] into a [`Program`].
pub fn compile(script: &Script, name: &str) -> CodegenResult<Program> {
    let mut ctx = Emitter::new();
    for stmt in &script.body {
        ctx.hoist(stmt);
    }
    emit_stmts(&script.body, &mut ctx)?;
    if ctx.instrs.len() > MAX_PROGRAM_LEN {
        return Err(CodegenError::LimitExceeded(format!(
            "program has {} instructions, the limit is {MAX_PROGRAM_LEN}",
            ctx.instrs.len()
        )));
    }
    Ok(Program {
        name: name.to_string(),
        instrs: ctx.instrs,
        slots: ctx.slots,
        source_map: ctx.source_map,
    })
}

// ══════════════════════════════════════════════════════════════════════════════
// Emitter
// ══════════════════════════════════════════════════════════════════════════════

/// Jumps waiting for the end or the continue point of one loop.
#[derive(Default)]
struct LoopContext {
    breaks: Vec<usize>,
    continues: Vec<usize>,
}

/// Mutable state threaded through statement and expression emission.
pub(crate) struct Emitter {
    instrs: Vec<Instr>,
    source_map: SourceMap,
    slots: Vec<String>,
    slot_index: HashMap<String, Slot>,
    loops: Vec<LoopContext>,
}

impl Emitter {
    fn new() -> Self {
        Self {
            instrs: Vec::new(),
            source_map: SourceMap::new(),
            slots: Vec::new(),
            slot_index: HashMap::new(),
            loops: Vec::new(),
        }
    }

    // ── Hoisting ─────────────────────────────────────────────────────────

    fn declare(&mut self, name: &str) {
        if !self.slot_index.contains_key(name) {
            let slot = self.slots.len() as Slot;
            self.slots.push(name.to_string());
            self.slot_index.insert(name.to_string(), slot);
        }
    }

    fn hoist(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(decl) => {
                for d in &decl.declarators {
                    self.declare(&d.name.name);
                }
            }
            Stmt::If(s) => self.hoist_if(s),
            Stmt::While(s) => self.hoist_block(&s.body),
            Stmt::For(s) => {
                if let Some(init) = &s.init {
                    self.hoist(init);
                }
                self.hoist_block(&s.body);
            }
            Stmt::Block(b) => self.hoist_block(b),
            Stmt::Assign(_) | Stmt::Step(_) | Stmt::Expr(_) | Stmt::Break(_) | Stmt::Continue(_) => {}
        }
    }

    fn hoist_if(&mut self, s: &IfStmt) {
        self.hoist_block(&s.then_branch);
        if let Some(b) = &s.else_branch {
            self.hoist_block(b);
        }
    }

    fn hoist_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.hoist(stmt);
        }
    }

    pub(crate) fn slot(&self, name: &str) -> CodegenResult<Slot> {
        self.slot_index
            .get(name)
            .copied()
            .ok_or_else(|| CodegenError::UnresolvedSymbol(name.to_string()))
    }

    // ── Emission ─────────────────────────────────────────────────────────

    /// Append an instruction and return its index.
    pub(crate) fn emit(&mut self, instr: Instr) -> usize {
        self.instrs.push(instr);
        self.instrs.len() - 1
    }

    pub(crate) fn push_const(&mut self, value: Value) {
        self.emit(Instr::Push(value));
    }

    /// Index the next instruction will have.
    pub(crate) fn here(&self) -> Target {
        self.instrs.len() as Target
    }

    /// Attribute instructions from here on to `span`.
    pub(crate) fn mark(&mut self, span: Span) {
        let at = self.here();
        self.source_map.push(at, span);
    }

    /// Point the jump at `at` to `target`.
    pub(crate) fn patch(&mut self, at: usize, target: Target) {
        if let Some(
            Instr::Jump(t)
            | Instr::JumpIfFalse(t)
            | Instr::JumpIfFalseKeep(t)
            | Instr::JumpIfTrueKeep(t),
        ) = self.instrs.get_mut(at)
        {
            *t = target;
        }
    }

    // ── Loops ────────────────────────────────────────────────────────────

    pub(crate) fn enter_loop(&mut self) {
        self.loops.push(LoopContext::default());
    }

    /// Close the innermost loop, patching its `break`s and `continue`s.
    pub(crate) fn leave_loop(&mut self, continue_target: Target, end: Target) {
        if let Some(ctx) = self.loops.pop() {
            for at in ctx.breaks {
                self.patch(at, end);
            }
            for at in ctx.continues {
                self.patch(at, continue_target);
            }
        }
    }

    pub(crate) fn emit_break(&mut self) -> CodegenResult<()> {
        let at = self.emit(Instr::Jump(0));
        self.loops
            .last_mut()
            .ok_or(CodegenError::OutsideLoop("break"))?
            .breaks
            .push(at);
        Ok(())
    }

    pub(crate) fn emit_continue(&mut self) -> CodegenResult<()> {
        let at = self.emit(Instr::Jump(0));
        self.loops
            .last_mut()
            .ok_or(CodegenError::OutsideLoop("continue"))?
            .continues
            .push(at);
        Ok(())
    }
}
