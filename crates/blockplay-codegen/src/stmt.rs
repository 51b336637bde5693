//! Statement code generation.
//!
//! Statements leave the operand stack as they found it.

use blockplay_types::ast::*;
use blockplay_types::Value;

use crate::compiler::Emitter;
use crate::error::CodegenResult;
use crate::expr::{emit_expr, highlight_id};
use crate::instr::Instr;

/// Emit a slice of statements.
pub(crate) fn emit_stmts(stmts: &[Stmt], ctx: &mut Emitter) -> CodegenResult<()> {
    for stmt in stmts {
        emit_stmt(stmt, ctx)?;
    }
    Ok(())
}

/// Emit a single statement.
pub(crate) fn emit_stmt(stmt: &Stmt, ctx: &mut Emitter) -> CodegenResult<()> {
    match stmt {
        Stmt::Var(decl) => emit_var(decl, ctx),
        Stmt::Assign(assign) => emit_assign(assign, ctx),
        Stmt::Step(step) => emit_step(step, ctx),
        Stmt::Expr(expr_stmt) => emit_expr_stmt(expr_stmt, ctx),
        Stmt::If(if_stmt) => emit_if(if_stmt, ctx),
        Stmt::While(while_stmt) => emit_while(while_stmt, ctx),
        Stmt::For(for_stmt) => emit_for(for_stmt, ctx),
        Stmt::Break(span) => {
            ctx.mark(*span);
            ctx.emit_break()
        }
        Stmt::Continue(span) => {
            ctx.mark(*span);
            ctx.emit_continue()
        }
        Stmt::Block(block) => emit_stmts(&block.stmts, ctx),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Simple statements
// ══════════════════════════════════════════════════════════════════════════════

/// Slots are hoisted, so only initialisers produce code.
fn emit_var(decl: &VarDecl, ctx: &mut Emitter) -> CodegenResult<()> {
    for d in &decl.declarators {
        if let Some(init) = &d.init {
            ctx.mark(decl.span);
            emit_expr(init, ctx)?;
            let slot = ctx.slot(&d.name.name)?;
            ctx.emit(Instr::Store(slot));
        }
    }
    Ok(())
}

fn emit_assign(assign: &Assign, ctx: &mut Emitter) -> CodegenResult<()> {
    ctx.mark(assign.span);
    let slot = ctx.slot(&assign.target.name)?;
    match assign.op.binary() {
        Some(op) => {
            ctx.emit(Instr::Load(slot));
            emit_expr(&assign.value, ctx)?;
            ctx.emit(Instr::Binary(op));
        }
        None => emit_expr(&assign.value, ctx)?,
    }
    ctx.emit(Instr::Store(slot));
    Ok(())
}

/// `x++` / `x--` coerce to a number first, so `'1'++` is 2, not `'11'`.
fn emit_step(step: &StepStmt, ctx: &mut Emitter) -> CodegenResult<()> {
    ctx.mark(step.span);
    let slot = ctx.slot(&step.target.name)?;
    ctx.emit(Instr::Load(slot));
    ctx.emit(Instr::ToNumber);
    ctx.push_const(Value::Number(step.delta));
    ctx.emit(Instr::Binary(BinOp::Add));
    ctx.emit(Instr::Store(slot));
    Ok(())
}

fn emit_expr_stmt(stmt: &ExprStmt, ctx: &mut Emitter) -> CodegenResult<()> {
    ctx.mark(stmt.span);
    // a highlight in statement position needs no result on the stack
    if let Some(id) = highlight_id(&stmt.expr)? {
        ctx.emit(Instr::Highlight(id));
        return Ok(());
    }
    emit_expr(&stmt.expr, ctx)?;
    ctx.emit(Instr::Pop);
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════════
// Control flow
// ══════════════════════════════════════════════════════════════════════════════

fn emit_if(if_stmt: &IfStmt, ctx: &mut Emitter) -> CodegenResult<()> {
    ctx.mark(if_stmt.condition.span);
    emit_expr(&if_stmt.condition, ctx)?;
    let to_else = ctx.emit(Instr::JumpIfFalse(0));
    emit_stmts(&if_stmt.then_branch.stmts, ctx)?;

    match &if_stmt.else_branch {
        Some(else_branch) => {
            let to_end = ctx.emit(Instr::Jump(0));
            let else_start = ctx.here();
            ctx.patch(to_else, else_start);
            emit_stmts(&else_branch.stmts, ctx)?;
            let end = ctx.here();
            ctx.patch(to_end, end);
        }
        None => {
            let end = ctx.here();
            ctx.patch(to_else, end);
        }
    }
    Ok(())
}

fn emit_while(while_stmt: &WhileStmt, ctx: &mut Emitter) -> CodegenResult<()> {
    let start = ctx.here();
    ctx.mark(while_stmt.condition.span);
    emit_expr(&while_stmt.condition, ctx)?;
    let exit = ctx.emit(Instr::JumpIfFalse(0));

    ctx.enter_loop();
    emit_stmts(&while_stmt.body.stmts, ctx)?;
    ctx.mark(while_stmt.span);
    ctx.emit(Instr::Jump(start));

    let end = ctx.here();
    ctx.patch(exit, end);
    ctx.leave_loop(start, end);
    Ok(())
}

fn emit_for(for_stmt: &ForStmt, ctx: &mut Emitter) -> CodegenResult<()> {
    if let Some(init) = &for_stmt.init {
        emit_stmt(init, ctx)?;
    }

    let start = ctx.here();
    let exit = match &for_stmt.condition {
        Some(cond) => {
            ctx.mark(cond.span);
            emit_expr(cond, ctx)?;
            Some(ctx.emit(Instr::JumpIfFalse(0)))
        }
        None => None,
    };

    ctx.enter_loop();
    emit_stmts(&for_stmt.body.stmts, ctx)?;

    let continue_target = ctx.here();
    if let Some(update) = &for_stmt.update {
        emit_stmt(update, ctx)?;
    }
    ctx.mark(for_stmt.span);
    ctx.emit(Instr::Jump(start));

    let end = ctx.here();
    if let Some(exit) = exit {
        ctx.patch(exit, end);
    }
    ctx.leave_loop(continue_target, end);
    Ok(())
}
