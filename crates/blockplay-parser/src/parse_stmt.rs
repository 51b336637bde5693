//! Statement parsing.

use blockplay_lexer::token::TokenKind;
use blockplay_types::ast::*;
use blockplay_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse one statement.
    ///
    /// Returns `None` after reporting an error, `Some(None)` for an empty
    /// statement (a lone `;`).
    pub(crate) fn parse_statement(&mut self) -> Option<Option<Stmt>> {
        let stmt = match self.peek_kind() {
            TokenKind::Semicolon => {
                self.advance();
                return Some(None);
            }
            TokenKind::Var | TokenKind::Let | TokenKind::Const => self.parse_var_decl(),
            TokenKind::If => self.parse_if().map(Stmt::If),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Break => {
                let span = self.advance().span;
                self.end_statement();
                Some(Stmt::Break(span))
            }
            TokenKind::Continue => {
                let span = self.advance().span;
                self.end_statement();
                Some(Stmt::Continue(span))
            }
            TokenKind::LBrace => self.parse_block().map(Stmt::Block),
            TokenKind::Function | TokenKind::Return => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!(
                        "'{}' is not supported: procedure blocks cannot be run here",
                        self.peek_kind()
                    ),
                );
                None
            }
            _ => {
                let stmt = self.parse_simple_statement()?;
                self.end_statement();
                Some(stmt)
            }
        };
        stmt.map(Some)
    }

    /// `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        if !self.enter_nested() {
            return None;
        }
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let before = self.current_span();
            match self.parse_statement() {
                Some(Some(stmt)) => stmts.push(stmt),
                Some(None) => {}
                None => {
                    self.synchronize();
                    // a bare `{` we stopped on would be reparsed forever
                    if self.current_span() == before && !self.check(&TokenKind::RBrace) {
                        self.advance();
                    }
                }
            }
        }
        self.leave_nested();
        self.expect(&TokenKind::RBrace)?;
        Some(Block {
            stmts,
            span: start.merge(self.previous_span()),
        })
    }

    /// Loop and branch bodies: a braced block or one statement.
    fn parse_body(&mut self) -> Option<Block> {
        if self.check(&TokenKind::LBrace) {
            return self.parse_block();
        }
        let start = self.current_span();
        if !self.enter_nested() {
            return None;
        }
        let stmt = self.parse_statement();
        self.leave_nested();
        let stmt = stmt?;
        Some(Block {
            stmts: stmt.into_iter().collect(),
            span: start.merge(self.previous_span()),
        })
    }

    /// `var a, b = e;`
    fn parse_var_decl(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let mut declarators = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            let init = if self.eat(&TokenKind::Eq) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            declarators.push(Declarator { name, init });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let span = start.merge(self.previous_span());
        self.end_statement();
        Some(Stmt::Var(VarDecl { declarators, span }))
    }

    /// `if (cond) body [else (if ... | body)]`
    fn parse_if(&mut self) -> Option<IfStmt> {
        let start = self.advance().span;
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let then_branch = self.parse_body()?;
        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                if !self.enter_nested() {
                    return None;
                }
                let nested = self.parse_if();
                self.leave_nested();
                let nested = nested?;
                let span = nested.span;
                Some(Block {
                    stmts: vec![Stmt::If(nested)],
                    span,
                })
            } else {
                Some(self.parse_body()?)
            }
        } else {
            None
        };
        Some(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: start.merge(self.previous_span()),
        })
    }

    /// `while (cond) body`
    fn parse_while(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_body()?;
        Some(Stmt::While(WhileStmt {
            condition,
            body,
            span: start.merge(self.previous_span()),
        }))
    }

    /// `for (init; cond; update) body`
    fn parse_for(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        self.expect(&TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.peek_kind(),
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            let decl_start = self.advance().span;
            let name = self.expect_identifier()?;
            let init = if self.eat(&TokenKind::Eq) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            Some(Box::new(Stmt::Var(VarDecl {
                declarators: vec![Declarator { name, init }],
                span: decl_start.merge(self.previous_span()),
            })))
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect(&TokenKind::Semicolon)?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect(&TokenKind::RParen)?;

        let body = self.parse_body()?;
        Some(Stmt::For(ForStmt {
            init,
            condition,
            update,
            body,
            span: start.merge(self.previous_span()),
        }))
    }

    /// Assignment, `++`/`--`, or an expression, without the terminator.
    fn parse_simple_statement(&mut self) -> Option<Stmt> {
        let start = self.current_span();

        // prefix `++x` / `--x`
        if matches!(self.peek_kind(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let delta = if self.advance().kind == TokenKind::PlusPlus {
                1.0
            } else {
                -1.0
            };
            let target = self.expect_identifier()?;
            return Some(Stmt::Step(StepStmt {
                target,
                delta,
                span: start.merge(self.previous_span()),
            }));
        }

        if let TokenKind::Identifier(_) = self.peek_kind() {
            let op = match self.look_ahead(1) {
                TokenKind::Eq => Some(AssignOp::Assign),
                TokenKind::PlusEq => Some(AssignOp::AddAssign),
                TokenKind::MinusEq => Some(AssignOp::SubAssign),
                TokenKind::StarEq => Some(AssignOp::MulAssign),
                TokenKind::SlashEq => Some(AssignOp::DivAssign),
                _ => None,
            };
            if let Some(op) = op {
                let target = self.expect_identifier()?;
                self.advance(); // operator
                let value = self.parse_expression()?;
                return Some(Stmt::Assign(Assign {
                    target,
                    op,
                    value,
                    span: start.merge(self.previous_span()),
                }));
            }
            let delta = match self.look_ahead(1) {
                TokenKind::PlusPlus => Some(1.0),
                TokenKind::MinusMinus => Some(-1.0),
                _ => None,
            };
            if let Some(delta) = delta {
                let target = self.expect_identifier()?;
                self.advance();
                return Some(Stmt::Step(StepStmt {
                    target,
                    delta,
                    span: start.merge(self.previous_span()),
                }));
            }
        }

        let expr = self.parse_expression()?;
        if matches!(
            self.peek_kind(),
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
        ) {
            self.error_at_current(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                "only variables can be assigned to",
            );
            return None;
        }
        let span = expr.span;
        Some(Stmt::Expr(ExprStmt { expr, span }))
    }
}
