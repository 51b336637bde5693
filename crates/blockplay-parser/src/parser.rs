//! Core parser infrastructure: token cursor, error reporting, helpers.

use blockplay_lexer::token::{Token, TokenKind};
use blockplay_types::ast::{Ident, Script};
use blockplay_types::{CompileErrors, ErrorCode, ScriptError, SourceFile, Span};

/// Maximum nesting of blocks, bodies and expression operators combined.
///
/// Every operator in a chain like `a + b + c` adds a level, since the tree
/// it builds is as deep as the chain is long.
pub(crate) const MAX_DEPTH: u32 = 128;

/// Recursive-descent parser for generated scripts.
///
/// Collects errors and resynchronises at statement boundaries so one bad
/// block does not hide problems in the rest of the workspace.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    errors: CompileErrors,
    /// Current expression/block nesting depth.
    pub(crate) depth: u32,
}

/// Result of parsing.
pub struct ParseResult {
    /// `None` when the script could not be parsed at all.
    pub script: Option<Script>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
            depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        static EOF: Token = Token {
            kind: TokenKind::Eof,
            span: Span {
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 1,
            },
        };
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_else(|| Span::point(1, 1))
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Advance and return `true` if the current token is `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            let code = if matches!(expected, TokenKind::RParen | TokenKind::RBrace) {
                ErrorCode::UNCLOSED_DELIMITER
            } else {
                ErrorCode::UNEXPECTED_TOKEN
            };
            self.error_at_current(
                code,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            kind if kind.is_keyword() => {
                self.error_at_current(
                    ErrorCode::RESERVED_NAME,
                    format!("'{kind}' is a reserved word and cannot be used as a name"),
                );
                // consume it so recovery does not restart at the keyword
                self.advance();
                None
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// Statement terminator: `;` is optional before `}` or end of file and
    /// when the next statement starts on a new line.
    pub(crate) fn end_statement(&mut self) {
        if self.eat(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.at_end()
            || self.current_span().start_line > self.previous_span().end_line
        {
            return;
        }
        self.error_at_current(
            ErrorCode::UNEXPECTED_TOKEN,
            format!("expected ';', got '{}'", self.peek_kind()),
        );
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error = ScriptError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(error);
    }

    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_full()
    }

    /// Enter one nesting level; reports and returns `false` past [`MAX_DEPTH`].
    pub(crate) fn enter_nested(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("code nested deeper than {MAX_DEPTH} levels"),
            );
            self.depth -= 1;
            return false;
        }
        true
    }

    pub(crate) fn leave_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip to the next statement boundary after an error.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.eat(&TokenKind::Semicolon) {
                return;
            }
            match self.peek_kind() {
                TokenKind::Var
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::LBrace
                | TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Script`].
    pub fn parse(mut self) -> ParseResult {
        let start = self.current_span();
        let mut body = Vec::new();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if self.check(&TokenKind::RBrace) {
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "unmatched '}'");
                self.advance();
                continue;
            }
            let before = self.pos;
            match self.parse_statement() {
                Some(Some(stmt)) => body.push(stmt),
                Some(None) => {}
                None => {
                    self.synchronize();
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }
        let span = start.merge(self.previous_span());
        let script = if self.errors.has_errors() {
            None
        } else {
            Some(Script { body, span })
        };
        ParseResult {
            script,
            errors: self.errors,
        }
    }
}
