//! Expression code generation.
//!
//! Every expression leaves exactly one value on the operand stack.

use blockplay_types::ast::*;
use blockplay_types::{Value, HIGHLIGHT_FUNCTION};

use crate::compiler::Emitter;
use crate::error::{CodegenError, CodegenResult};
use crate::instr::Instr;

/// Emit an expression.
pub(crate) fn emit_expr(expr: &Expr, ctx: &mut Emitter) -> CodegenResult<()> {
    match &expr.kind {
        ExprKind::Number(n) => ctx.push_const(Value::Number(*n)),
        ExprKind::Str(s) => ctx.push_const(Value::Str(s.clone())),
        ExprKind::Bool(b) => ctx.push_const(Value::Bool(*b)),
        ExprKind::Undefined => ctx.push_const(Value::Undefined),
        ExprKind::MathConst(c) => ctx.push_const(Value::Number(c.value())),
        ExprKind::Ident(name) => {
            let slot = ctx.slot(name)?;
            ctx.emit(Instr::Load(slot));
        }
        ExprKind::Call { callee, args } => {
            if let Some(id) = highlight_id(expr)? {
                ctx.mark(expr.span);
                ctx.emit(Instr::Highlight(id));
                ctx.push_const(Value::Undefined);
                return Ok(());
            }
            let argc = emit_args(args, ctx)?;
            ctx.mark(expr.span);
            ctx.emit(Instr::CallHost {
                name: callee.name.clone(),
                argc,
            });
        }
        ExprKind::MathCall { function, args } => {
            let argc = emit_args(args, ctx)?;
            ctx.mark(expr.span);
            ctx.emit(Instr::CallMath {
                function: *function,
                argc,
            });
        }
        ExprKind::Unary { op, operand } => {
            emit_expr(operand, ctx)?;
            ctx.emit(match op {
                UnaryOp::Neg => Instr::Neg,
                UnaryOp::Plus => Instr::ToNumber,
                UnaryOp::Not => Instr::Not,
            });
        }
        ExprKind::Binary { left, op, right } => {
            emit_expr(left, ctx)?;
            emit_expr(right, ctx)?;
            ctx.emit(Instr::Binary(*op));
        }
        ExprKind::Logical { left, op, right } => {
            emit_expr(left, ctx)?;
            let skip = ctx.emit(match op {
                LogicalOp::And => Instr::JumpIfFalseKeep(0),
                LogicalOp::Or => Instr::JumpIfTrueKeep(0),
            });
            emit_expr(right, ctx)?;
            let end = ctx.here();
            ctx.patch(skip, end);
        }
    }
    Ok(())
}

fn emit_args(args: &[Expr], ctx: &mut Emitter) -> CodegenResult<u8> {
    let argc = u8::try_from(args.len()).map_err(|_| {
        CodegenError::LimitExceeded(format!("{} call arguments, the limit is 255", args.len()))
    })?;
    for arg in args {
        emit_expr(arg, ctx)?;
    }
    Ok(argc)
}

/// The block id of a `highlightBlock('id')` call, `None` for any other
/// expression.
pub(crate) fn highlight_id(expr: &Expr) -> CodegenResult<Option<String>> {
    let ExprKind::Call { callee, args } = &expr.kind else {
        return Ok(None);
    };
    if callee.name != HIGHLIGHT_FUNCTION {
        return Ok(None);
    }
    match args.as_slice() {
        [Expr {
            kind: ExprKind::Str(id),
            ..
        }] => Ok(Some(id.clone())),
        _ => Err(CodegenError::InvalidHighlight(format!(
            "{HIGHLIGHT_FUNCTION} expects one string literal, got {} argument(s)",
            args.len()
        ))),
    }
}
