use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors kept before the remaining ones are only counted.
pub const MAX_ERRORS: usize = 20;

/// Error category, derived from the code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Name,
    Call,
    Structure,
}

/// Numeric diagnostic code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNCLOSED_DELIMITER: Self = Self(101);
    pub const UNTERMINATED_STRING: Self = Self(102);
    pub const INVALID_ASSIGNMENT_TARGET: Self = Self(103);

    // ── Names (E200–E299) ──
    pub const UNDECLARED_VARIABLE: Self = Self(200);
    pub const UNKNOWN_FUNCTION: Self = Self(201);
    pub const UNKNOWN_MATH_MEMBER: Self = Self(202);
    pub const RESERVED_NAME: Self = Self(203);

    // ── Calls (E300–E399) ──
    pub const WRONG_ARG_COUNT: Self = Self(300);
    pub const INVALID_HIGHLIGHT: Self = Self(301);

    // ── Structure (E400–E499) ──
    pub const BREAK_OUTSIDE_LOOP: Self = Self(400);
    pub const CONTINUE_OUTSIDE_LOOP: Self = Self(401);
    pub const NESTING_LIMIT_EXCEEDED: Self = Self(402);
    pub const PROGRAM_TOO_LARGE: Self = Self(403);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            200..=299 => ErrorCategory::Name,
            300..=399 => ErrorCategory::Call,
            400..=499 => ErrorCategory::Structure,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Name => write!(f, "name"),
            Self::Call => write!(f, "call"),
            Self::Structure => write!(f, "structure"),
        }
    }
}

/// A structured diagnostic for a generated script.
///
/// Hosts render these next to the block editor; they must not parse the
/// free-form `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptError {
    pub file: String,
    pub code: ErrorCode,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, verbatim.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ScriptError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for ScriptError {}

/// All diagnostics produced while compiling one script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<ScriptError>,
    pub total_errors: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// True once [`MAX_ERRORS`] errors have been recorded and stages should stop.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Record an error. Only the first [`MAX_ERRORS`] are kept, all are counted.
    pub fn push_error(&mut self, error: ScriptError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.errors {
            writeln!(f, "{e}")?;
            if !e.source_line.is_empty() {
                writeln!(f, "    | {}", e.source_line)?;
            }
        }
        if self.total_errors > self.errors.len() {
            writeln!(f, "... and {} more", self.total_errors - self.errors.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}
