//! Name and call checker: walks a parsed script before code generation.
//!
//! Entry point: [`Checker::check`].
//!
//! Error codes emitted:
//! - E200: variable used or assigned without a `var` declaration
//! - E201: call to a function the task does not provide
//! - E202: unknown `Math` member (reported by the parser, never here)
//! - E300: wrong argument count for a task or `Math` function
//! - E301: `highlightBlock` without a single string literal
//! - E400: `break` outside a loop
//! - E401: `continue` outside a loop
//!
//! Variables are function-scoped like `var`: a declaration anywhere in the
//! script makes the name usable everywhere.

use std::collections::HashSet;

use blockplay_types::ast::*;
use blockplay_types::{
    lookup_signature, CompileErrors, ErrorCode, FunctionSig, ScriptError, SourceFile, Span,
    HIGHLIGHT_FUNCTION,
};

// ══════════════════════════════════════════════════════════════════════════════
// Checker
// ══════════════════════════════════════════════════════════════════════════════

/// Walks a parsed [`Script`] and validates names and calls against a task's
/// function table.
pub struct Checker<'a> {
    errors: &'a mut CompileErrors,
    source: &'a SourceFile,
    signatures: &'a [FunctionSig],
    /// Every name declared by some `var`, collected up front.
    declared: HashSet<String>,
    /// Number of loops enclosing the current statement.
    loop_depth: u32,
}

impl<'a> Checker<'a> {
    pub fn new(
        errors: &'a mut CompileErrors,
        source: &'a SourceFile,
        signatures: &'a [FunctionSig],
    ) -> Self {
        Self {
            errors,
            source,
            signatures,
            declared: HashSet::new(),
            loop_depth: 0,
        }
    }

    /// Check a complete script.
    pub fn check(&mut self, script: &Script) {
        for stmt in &script.body {
            self.collect_declarations(stmt);
        }
        self.check_stmts(&script.body);
    }

    fn collect_declarations(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(decl) => {
                for d in &decl.declarators {
                    self.declared.insert(d.name.name.clone());
                }
            }
            Stmt::If(s) => {
                self.collect_in_block(&s.then_branch);
                if let Some(b) = &s.else_branch {
                    self.collect_in_block(b);
                }
            }
            Stmt::While(s) => self.collect_in_block(&s.body),
            Stmt::For(s) => {
                if let Some(init) = &s.init {
                    self.collect_declarations(init);
                }
                self.collect_in_block(&s.body);
            }
            Stmt::Block(b) => self.collect_in_block(b),
            Stmt::Assign(_) | Stmt::Step(_) | Stmt::Expr(_) | Stmt::Break(_) | Stmt::Continue(_) => {}
        }
    }

    fn collect_in_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.collect_declarations(stmt);
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn check_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if self.errors.is_full() {
                return;
            }
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(decl) => {
                for d in &decl.declarators {
                    if let Some(init) = &d.init {
                        self.check_expr(init);
                    }
                }
            }
            Stmt::Assign(assign) => {
                self.check_variable(&assign.target.name, assign.target.span);
                self.check_expr(&assign.value);
            }
            Stmt::Step(step) => self.check_variable(&step.target.name, step.target.span),
            Stmt::Expr(s) => self.check_expr(&s.expr),
            Stmt::If(s) => {
                self.check_expr(&s.condition);
                self.check_stmts(&s.then_branch.stmts);
                if let Some(b) = &s.else_branch {
                    self.check_stmts(&b.stmts);
                }
            }
            Stmt::While(s) => {
                self.check_expr(&s.condition);
                self.check_loop_body(&s.body);
            }
            Stmt::For(s) => {
                if let Some(init) = &s.init {
                    self.check_stmt(init);
                }
                if let Some(cond) = &s.condition {
                    self.check_expr(cond);
                }
                if let Some(update) = &s.update {
                    self.check_stmt(update);
                }
                self.check_loop_body(&s.body);
            }
            Stmt::Break(span) => {
                if self.loop_depth == 0 {
                    self.error(
                        ErrorCode::BREAK_OUTSIDE_LOOP,
                        "'break' can only be used inside a loop".into(),
                        *span,
                    );
                }
            }
            Stmt::Continue(span) => {
                if self.loop_depth == 0 {
                    self.error(
                        ErrorCode::CONTINUE_OUTSIDE_LOOP,
                        "'continue' can only be used inside a loop".into(),
                        *span,
                    );
                }
            }
            Stmt::Block(b) => self.check_stmts(&b.stmts),
        }
    }

    fn check_loop_body(&mut self, body: &Block) {
        self.loop_depth += 1;
        self.check_stmts(&body.stmts);
        self.loop_depth -= 1;
    }

    fn check_variable(&mut self, name: &str, span: Span) {
        if self.declared.contains(name) {
            return;
        }
        let mut message = format!("'{name}' is not declared");
        if lookup_signature(self.signatures, name).is_some() {
            message.push_str(&format!("; '{name}' is a function, call it as {name}(...)"));
        }
        let error = self
            .script_error(ErrorCode::UNDECLARED_VARIABLE, message, span)
            .with_suggestion(format!("add 'var {name};' at the top of the script"));
        self.errors.push_error(error);
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn check_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Number(_)
            | ExprKind::Str(_)
            | ExprKind::Bool(_)
            | ExprKind::Undefined
            | ExprKind::MathConst(_) => {}
            ExprKind::Ident(name) => self.check_variable(name, expr.span),
            ExprKind::Call { callee, args } => {
                for arg in args {
                    self.check_expr(arg);
                }
                self.check_call(callee, args, expr.span);
            }
            ExprKind::MathCall { function, args } => {
                for arg in args {
                    self.check_expr(arg);
                }
                let (min, max) = function.arity();
                if args.len() < min || args.len() > max {
                    let expected = if min == max {
                        plural(min, "argument")
                    } else {
                        format!("{min} to {max} arguments")
                    };
                    self.error(
                        ErrorCode::WRONG_ARG_COUNT,
                        format!(
                            "Math.{} expects {expected}, got {}",
                            function.name(),
                            args.len()
                        ),
                        expr.span,
                    );
                }
            }
            ExprKind::Unary { operand, .. } => self.check_expr(operand),
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                self.check_expr(left);
                self.check_expr(right);
            }
        }
    }

    fn check_call(&mut self, callee: &Ident, args: &[Expr], span: Span) {
        if callee.name == HIGHLIGHT_FUNCTION {
            if !matches!(args, [Expr { kind: ExprKind::Str(_), .. }]) {
                self.error(
                    ErrorCode::INVALID_HIGHLIGHT,
                    format!("{HIGHLIGHT_FUNCTION} expects one block id string"),
                    span,
                );
            }
            return;
        }

        let Some(sig) = lookup_signature(self.signatures, &callee.name) else {
            let mut error = self.script_error(
                ErrorCode::UNKNOWN_FUNCTION,
                format!("unknown function '{}'", callee.name),
                callee.span,
            );
            let names = self.signatures.iter().map(|s| s.name);
            if let Some(close) = closest_name(&callee.name, names) {
                error = error.with_suggestion(format!("did you mean '{close}'?"));
            }
            self.errors.push_error(error);
            return;
        };

        if args.len() != sig.arity() {
            let params = sig.params.join(", ");
            self.error(
                ErrorCode::WRONG_ARG_COUNT,
                format!(
                    "{}({params}) expects {}, got {}",
                    sig.name,
                    plural(sig.arity(), "argument"),
                    args.len()
                ),
                span,
            );
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Error Reporting
    // ══════════════════════════════════════════════════════════════════════

    fn script_error(&self, code: ErrorCode, message: String, span: Span) -> ScriptError {
        let source_line = self.source.line(span.start_line).unwrap_or("");
        ScriptError::new(&self.source.name, code, message, span, source_line)
    }

    fn error(&mut self, code: ErrorCode, message: String, span: Span) {
        let error = self.script_error(code, message, span);
        self.errors.push_error(error);
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("1 {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// The candidate within edit distance 2 of `name`, if any.
fn closest_name<'n>(name: &str, candidates: impl Iterator<Item = &'n str>) -> Option<&'n str> {
    candidates
        .map(|c| (edit_distance(name, c), c))
        .filter(|(d, _)| *d <= 2)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c)
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut cur = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }
    prev[b.len()]
}
