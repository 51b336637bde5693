//! Integration tests for the instruction code generator.
//!
//! Tests validate:
//! - Hoisting of `var` declarations into slots
//! - Lowering of assignments, `++`/`--` and expression statements
//! - Jump layout for `if`, `while`, `for`, `break` and `continue`
//! - Short-circuit `&&` / `||`
//! - Highlight markers and the source map

use blockplay_codegen::{compile, CodegenError, Instr, Program};
use blockplay_lexer::Lexer;
use blockplay_parser::Parser;
use blockplay_types::ast::{BinOp, Script};
use blockplay_types::{MathFn, SourceFile, Value};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Parse script source into an AST (panics on parse errors).
fn parse(source: &str) -> Script {
    let sf = SourceFile::new("main.js", source);
    let lex = Lexer::new(&sf).lex();
    let result = Parser::new(lex.tokens, &sf).parse();
    if result.errors.has_errors() {
        panic!(
            "parse errors:\n{}",
            result
                .errors
                .errors
                .iter()
                .map(|e| format!("  [{}] {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
    result.script.expect("no script after successful parse")
}

fn compile_source(source: &str) -> Program {
    compile(&parse(source), "main.js").unwrap_or_else(|e| panic!("codegen failed: {e}"))
}

fn try_compile(source: &str) -> Result<Program, CodegenError> {
    compile(&parse(source), "main.js")
}

fn call(name: &str, argc: u8) -> Instr {
    Instr::CallHost {
        name: name.to_string(),
        argc,
    }
}

fn num(n: f64) -> Instr {
    Instr::Push(Value::Number(n))
}

// ══════════════════════════════════════════════════════════════════════════════
// Variables
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn empty_script_compiles_to_nothing() {
    let program = compile_source("");
    assert!(program.is_empty());
    assert_eq!(program.name, "main.js");
}

#[test]
fn declaration_without_initialiser_emits_no_code() {
    let program = compile_source("var a, b;");
    assert!(program.is_empty());
    assert_eq!(program.slots, ["a", "b"]);
}

#[test]
fn var_and_compound_assignment() {
    let program = compile_source("var x = 1;\nx += 2;");
    assert_eq!(
        program.instrs,
        [
            num(1.0),
            Instr::Store(0),
            Instr::Load(0),
            num(2.0),
            Instr::Binary(BinOp::Add),
            Instr::Store(0),
        ]
    );
}

#[test]
fn increment_coerces_to_number() {
    let program = compile_source("var i;\ni--;");
    assert_eq!(
        program.instrs,
        [
            Instr::Load(0),
            Instr::ToNumber,
            num(-1.0),
            Instr::Binary(BinOp::Add),
            Instr::Store(0),
        ]
    );
}

#[test]
fn declarations_are_hoisted() {
    let program = compile_source("x = 1;\nwhile (false) { var y; }\nvar x;");
    assert_eq!(program.slots, ["y", "x"]);
    assert_eq!(program.slot_of("x"), Some(1));
}

#[test]
fn undeclared_variable_is_unresolved() {
    assert_eq!(
        try_compile("x = 1;").unwrap_err(),
        CodegenError::UnresolvedSymbol("x".into())
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Calls
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn expression_statement_discards_result() {
    let program = compile_source("grad_update_x(grad_x_value() * 2);");
    assert_eq!(
        program.instrs,
        [
            call("grad_x_value", 0),
            num(2.0),
            Instr::Binary(BinOp::Mul),
            call("grad_update_x", 1),
            Instr::Pop,
        ]
    );
}

#[test]
fn math_calls_and_constants() {
    let program = compile_source("var r = Math.max(1, Math.PI);");
    assert_eq!(
        program.instrs,
        [
            num(1.0),
            num(std::f64::consts::PI),
            Instr::CallMath {
                function: MathFn::Max,
                argc: 2
            },
            Instr::Store(0),
        ]
    );
}

#[test]
fn highlight_statement_is_a_bare_marker() {
    let program = compile_source("highlightBlock('b1');\nmaze_turn_left();");
    assert_eq!(
        program.instrs,
        [
            Instr::Highlight("b1".into()),
            call("maze_turn_left", 0),
            Instr::Pop,
        ]
    );
    assert_eq!(program.highlight_ids().collect::<Vec<_>>(), ["b1"]);
}

#[test]
fn highlight_in_expression_position_yields_undefined() {
    let program = compile_source("var x = highlightBlock('b');");
    assert_eq!(
        program.instrs,
        [
            Instr::Highlight("b".into()),
            Instr::Push(Value::Undefined),
            Instr::Store(0),
        ]
    );
}

#[test]
fn highlight_needs_a_string_literal() {
    assert!(matches!(
        try_compile("highlightBlock(1);"),
        Err(CodegenError::InvalidHighlight(_))
    ));
    assert!(matches!(
        try_compile("highlightBlock();"),
        Err(CodegenError::InvalidHighlight(_))
    ));
}

// ══════════════════════════════════════════════════════════════════════════════
// Control flow
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn if_else_layout() {
    let program = compile_source("var a;\nif (a) { f(); } else { g(); }");
    assert_eq!(
        program.instrs,
        [
            Instr::Load(0),
            Instr::JumpIfFalse(5),
            call("f", 0),
            Instr::Pop,
            Instr::Jump(7),
            call("g", 0),
            Instr::Pop,
        ]
    );
}

#[test]
fn if_without_else_jumps_past_the_branch() {
    let program = compile_source("if (true) f();");
    assert_eq!(
        program.instrs,
        [
            Instr::Push(Value::Bool(true)),
            Instr::JumpIfFalse(4),
            call("f", 0),
            Instr::Pop,
        ]
    );
}

#[test]
fn while_with_break() {
    let program = compile_source("while (true) { break; }");
    assert_eq!(
        program.instrs,
        [
            Instr::Push(Value::Bool(true)),
            Instr::JumpIfFalse(4),
            Instr::Jump(4),
            Instr::Jump(0),
        ]
    );
}

#[test]
fn for_continue_jumps_to_update() {
    let program = compile_source("for (var i = 0; i < 3; i++) { continue; }");
    assert_eq!(
        program.instrs,
        [
            num(0.0),
            Instr::Store(0),
            // condition
            Instr::Load(0),
            num(3.0),
            Instr::Binary(BinOp::Less),
            Instr::JumpIfFalse(13),
            // body
            Instr::Jump(7),
            // update
            Instr::Load(0),
            Instr::ToNumber,
            num(1.0),
            Instr::Binary(BinOp::Add),
            Instr::Store(0),
            Instr::Jump(2),
        ]
    );
}

#[test]
fn nested_loop_break_targets_inner_loop() {
    let program = compile_source("while (a()) { while (b()) { break; } c(); }");
    // 2 b(), 3 exit, 4 break, 5 back edge, 6 c()
    assert_eq!(program.instrs[4], Instr::Jump(6));
    assert_eq!(program.instrs[6], call("c", 0));
    assert_eq!(program.instrs[8], Instr::Jump(0));
}

#[test]
fn for_without_condition_loops_forever() {
    let program = compile_source("for (;;) { f(); }");
    assert_eq!(program.instrs, [call("f", 0), Instr::Pop, Instr::Jump(0)]);
}

#[test]
fn break_outside_loop() {
    assert_eq!(
        try_compile("break;").unwrap_err(),
        CodegenError::OutsideLoop("break")
    );
    assert_eq!(
        try_compile("if (true) { continue; }").unwrap_err(),
        CodegenError::OutsideLoop("continue")
    );
}

#[test]
fn logical_operators_short_circuit() {
    let program = compile_source("var a, b;\na && b;\na || b;");
    assert_eq!(
        program.instrs,
        [
            Instr::Load(0),
            Instr::JumpIfFalseKeep(3),
            Instr::Load(1),
            Instr::Pop,
            Instr::Load(0),
            Instr::JumpIfTrueKeep(7),
            Instr::Load(1),
            Instr::Pop,
        ]
    );
}

#[test]
fn every_jump_target_is_in_range() {
    let program = compile_source(
        "var n = 0;\n\
         for (var i = 0; i < 10; i++) {\n\
           if (i % 2 == 0 && n < 3) { n++; continue; } else if (n > 5) { break; }\n\
           while (n < i) { n += 1; }\n\
         }",
    );
    for instr in &program.instrs {
        if let Some(t) = instr.target() {
            assert!(t as usize <= program.len(), "{instr} out of range");
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Source map
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn source_map_points_at_statement_lines() {
    let program = compile_source("var x;\nx = 1;\nf();");
    assert_eq!(program.source_map.lookup(0).map(|s| s.start_line), Some(2));
    assert_eq!(program.instrs[2], call("f", 0));
    assert_eq!(program.source_map.lookup(2).map(|s| s.start_line), Some(3));
}

#[test]
fn listing_includes_slots_and_positions() {
    let program = compile_source("var x;\nx = 1;");
    let listing = program.listing();
    assert!(listing.contains("; $0 = x"));
    assert!(listing.contains("store $0"));
    assert!(listing.contains("; 2:1"));
}

#[test]
fn compilation_is_deterministic() {
    let source = "var a = 1;\nwhile (a < 5) { highlightBlock('q'); a++; }";
    assert_eq!(compile_source(source), compile_source(source));
}
