//! blockplay compiler: orchestrates the script compilation pipeline.
//!
//! ```text
//! Script → Lexer → Parser → Checker → Codegen → Program
//! ```
//!
//! Every stage reports into [`CompileErrors`]; the pipeline stops after the
//! first stage that reports an error.

pub mod checker;
pub mod reference;

use serde::Serialize;

use blockplay_codegen::CodegenError;
use blockplay_lexer::Lexer;
use blockplay_parser::Parser;
use blockplay_types::ast::Script;
use blockplay_types::{CompileErrors, ErrorCode, FunctionSig, ScriptError, SourceFile, Span};

pub use blockplay_codegen::{Instr, Program, SourceMap};
pub use checker::Checker;

/// Serializable outcome of a compilation, for hosts that only want
/// diagnostics and a summary.
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    pub success: bool,
    /// Number of instructions, 0 on failure.
    pub instruction_count: usize,
    /// Hoisted variable names.
    pub variables: Vec<String>,
    /// Block ids in highlight order.
    pub blocks: Vec<String>,
    /// Instruction index → source span, empty on failure.
    pub source_map: SourceMap,
    pub errors: CompileErrors,
}

/// Lex and parse a source file.
pub fn parse(source_file: &SourceFile) -> Result<Script, CompileErrors> {
    let lexed = Lexer::new(source_file).lex();
    if lexed.errors.has_errors() {
        return Err(lexed.errors);
    }
    let parsed = Parser::new(lexed.tokens, source_file).parse();
    match parsed.script {
        Some(script) if !parsed.errors.has_errors() => Ok(script),
        _ => Err(parsed.errors),
    }
}

/// Run every check without generating code.
pub fn check(source: &str, name: &str, signatures: &[FunctionSig]) -> CompileErrors {
    let source_file = SourceFile::new(name, source);
    match parse(&source_file) {
        Ok(script) => {
            let mut errors = CompileErrors::empty();
            Checker::new(&mut errors, &source_file, signatures).check(&script);
            errors
        }
        Err(errors) => errors,
    }
}

/// Compile a script against a task's function table.
pub fn compile(source: &str, name: &str, signatures: &[FunctionSig]) -> Result<Program, CompileErrors> {
    let source_file = SourceFile::new(name, source);
    let script = parse(&source_file)?;

    let mut errors = CompileErrors::empty();
    Checker::new(&mut errors, &source_file, signatures).check(&script);
    if errors.has_errors() {
        tracing::debug!(script = name, errors = errors.total_errors, "script rejected");
        return Err(errors);
    }

    let program = blockplay_codegen::compile(&script, name)
        .map_err(|e| codegen_errors(&source_file, script.span, e))?;
    tracing::debug!(
        script = name,
        instructions = program.len(),
        variables = program.slots.len(),
        "script compiled"
    );
    Ok(program)
}

/// Compile and summarise the outcome as a [`CompileResult`].
pub fn compile_to_result(source: &str, name: &str, signatures: &[FunctionSig]) -> CompileResult {
    match compile(source, name, signatures) {
        Ok(program) => CompileResult {
            success: true,
            instruction_count: program.len(),
            blocks: program.highlight_ids().map(str::to_string).collect(),
            variables: program.slots,
            source_map: program.source_map,
            errors: CompileErrors::empty(),
        },
        Err(errors) => CompileResult {
            success: false,
            instruction_count: 0,
            variables: Vec::new(),
            blocks: Vec::new(),
            source_map: SourceMap::new(),
            errors,
        },
    }
}

/// Codegen failures carry no position; attribute them to the whole script.
fn codegen_errors(source_file: &SourceFile, span: Span, error: CodegenError) -> CompileErrors {
    let code = match &error {
        CodegenError::UnresolvedSymbol(_) => ErrorCode::UNDECLARED_VARIABLE,
        CodegenError::OutsideLoop("continue") => ErrorCode::CONTINUE_OUTSIDE_LOOP,
        CodegenError::OutsideLoop(_) => ErrorCode::BREAK_OUTSIDE_LOOP,
        CodegenError::InvalidHighlight(_) => ErrorCode::INVALID_HIGHLIGHT,
        CodegenError::LimitExceeded(_) => ErrorCode::PROGRAM_TOO_LARGE,
    };
    let source_line = source_file.line(span.start_line).unwrap_or("");
    let mut errors = CompileErrors::empty();
    errors.push_error(ScriptError::new(
        &source_file.name,
        code,
        error.to_string(),
        span,
        source_line,
    ));
    errors
}
