//! Expression parsing.
//!
//! Precedence (lowest → highest):
//! 7. `||`
//! 6. `&&`
//! 5. `==`, `!=`, `===`, `!==`
//! 4. `<`, `<=`, `>`, `>=`
//! 3. `+`, `-`
//! 2. `*`, `/`, `%`
//! 1. unary `-`, `+`, `!`
//!
//! Primaries are literals, identifiers, calls, `Math.<member>` and
//! parenthesised expressions.

use blockplay_lexer::token::TokenKind;
use blockplay_types::ast::*;
use blockplay_types::{ErrorCode, MathConst, MathFn};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        // operator chains below only ever enter levels
        let depth = self.depth;
        if !self.enter_nested() {
            return None;
        }
        let result = self.parse_or();
        self.depth = depth;
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// Right operand of a chain. Each operator adds a level for the rest of
    /// the chain, since the tree grows one deeper on the left.
    fn next_operand(&mut self, parse: fn(&mut Self) -> Option<Expr>) -> Option<Expr> {
        if !self.enter_nested() {
            return None;
        }
        let depth = self.depth;
        let operand = parse(self);
        self.depth = depth;
        operand
    }

    fn parse_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::PipePipe) {
            let right = self.next_operand(Self::parse_and)?;
            left = logical(left, LogicalOp::Or, right);
        }
        Some(left)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AmpAmp) {
            let right = self.next_operand(Self::parse_equality)?;
            left = logical(left, LogicalOp::And, right);
        }
        Some(left)
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                TokenKind::EqEqEq => BinOp::StrictEq,
                TokenKind::BangEqEq => BinOp::StrictNotEq,
                _ => break,
            };
            self.advance();
            let right = self.next_operand(Self::parse_comparison)?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn parse_comparison(&mut self) -> Option<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => BinOp::Less,
                TokenKind::LessEq => BinOp::LessEq,
                TokenKind::Greater => BinOp::Greater,
                TokenKind::GreaterEq => BinOp::GreaterEq,
                _ => break,
            };
            self.advance();
            let right = self.next_operand(Self::parse_additive)?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.next_operand(Self::parse_multiplicative)?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.next_operand(Self::parse_unary)?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let start = self.advance().span;
        if !self.enter_nested() {
            return None;
        }
        let operand = self.parse_unary();
        self.leave_nested();
        let operand = operand?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::Number(n) => {
                self.advance();
                Some(Expr::new(ExprKind::Number(n), start))
            }
            TokenKind::Str(s) => {
                self.advance();
                Some(Expr::new(ExprKind::Str(s), start))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::new(ExprKind::Bool(true), start))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(ExprKind::Bool(false), start))
            }
            TokenKind::Undefined | TokenKind::Null => {
                self.advance();
                Some(Expr::new(ExprKind::Undefined, start))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                // parentheses only group; widen the span to cover them
                let span = start.merge(self.previous_span());
                Some(Expr::new(inner.kind, span))
            }
            TokenKind::Identifier(name) if name == "Math" && *self.look_ahead(1) == TokenKind::Dot => {
                self.parse_math_member()
            }
            TokenKind::Identifier(_) => {
                let ident = self.expect_identifier()?;
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    let span = start.merge(self.previous_span());
                    Some(Expr::new(ExprKind::Call { callee: ident, args }, span))
                } else {
                    Some(Expr::new(ExprKind::Ident(ident.name), ident.span))
                }
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// `Math.fn(args)` or `Math.CONST`.
    fn parse_math_member(&mut self) -> Option<Expr> {
        let start = self.advance().span; // `Math`
        self.advance(); // `.`
        let member = self.expect_identifier()?;
        if self.check(&TokenKind::LParen) {
            let Some(function) = MathFn::from_name(&member.name) else {
                self.error_at(
                    ErrorCode::UNKNOWN_MATH_MEMBER,
                    format!("unknown function 'Math.{}'", member.name),
                    member.span,
                );
                return None;
            };
            let args = self.parse_call_args()?;
            let span = start.merge(self.previous_span());
            Some(Expr::new(ExprKind::MathCall { function, args }, span))
        } else {
            let Some(constant) = MathConst::from_name(&member.name) else {
                self.error_at(
                    ErrorCode::UNKNOWN_MATH_MEMBER,
                    format!("unknown constant 'Math.{}'", member.name),
                    member.span,
                );
                return None;
            };
            Some(Expr::new(
                ExprKind::MathConst(constant),
                start.merge(member.span),
            ))
        }
    }

    /// `( [expr { , expr }] )`
    fn parse_call_args(&mut self) -> Option<Vec<Expr>> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Some(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(args)
    }
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

fn logical(left: Expr, op: LogicalOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Logical {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}
