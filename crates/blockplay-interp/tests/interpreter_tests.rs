//! Interpreter tests: tick semantics, halting and the run state machine.

use blockplay_compiler::compile;
use blockplay_interp::{
    expect_args, number_arg, CallOutcome, Halt, HostError, HostFunctions, Interpreter, Limits,
    RunState, StartOutcome, TickReport,
};
use blockplay_types::{FunctionSig, Value};

const SIGS: &[FunctionSig] = &[
    FunctionSig::accessor("count", &[], "current count"),
    FunctionSig::mutator("bump", &[], "add one"),
    FunctionSig::mutator("set", &["n"], "set the count"),
    FunctionSig::mutator("fail", &[], "always rejected"),
    FunctionSig::mutator("win", &[], "always solves"),
];

#[derive(Default)]
struct Counter {
    count: f64,
    calls: Vec<String>,
}

impl HostFunctions for Counter {
    fn call(&mut self, name: &str, args: &[Value]) -> Result<CallOutcome, HostError> {
        self.calls.push(name.to_string());
        match name {
            "count" => {
                expect_args(name, args, 0)?;
                Ok(CallOutcome::Continue(Value::Number(self.count)))
            }
            "bump" => {
                expect_args(name, args, 0)?;
                self.count += 1.0;
                Ok(CallOutcome::Continue(Value::Undefined))
            }
            "set" => {
                expect_args(name, args, 1)?;
                self.count = number_arg(name, args, 0)?;
                Ok(CallOutcome::Continue(Value::Undefined))
            }
            "fail" => Ok(CallOutcome::DomainViolation("not allowed".into())),
            "win" => Ok(CallOutcome::Success("solved".into())),
            other => Err(HostError::UnknownFunction(other.to_string())),
        }
    }
}

fn started(source: &str, limits: Limits) -> Interpreter {
    let program = compile(source, "main.js", SIGS).expect("compile failed");
    let mut interp = Interpreter::new(limits);
    assert_eq!(interp.start(program), StartOutcome::Started);
    interp
}

fn stepped(block: &str) -> TickReport {
    TickReport::Stepped {
        block: Some(block.to_string()),
    }
}

#[test]
fn highlighted_block_runs_on_the_next_tick() {
    let mut host = Counter::default();
    let mut interp = started(
        "highlightBlock('a');\nbump();\nhighlightBlock('b');\nbump();",
        Limits::default(),
    );

    assert_eq!(interp.tick(&mut host), stepped("a"));
    assert_eq!(host.count, 0.0);
    assert_eq!(interp.highlighted(), Some("a"));

    assert_eq!(interp.tick(&mut host), stepped("b"));
    assert_eq!(host.count, 1.0);

    assert_eq!(interp.tick(&mut host), TickReport::Finished);
    assert_eq!(host.count, 2.0);
    assert_eq!(interp.state(), &RunState::Idle);
    assert_eq!(interp.highlighted(), None);
}

#[test]
fn loop_variables_advance_one_iteration_per_tick() {
    let mut host = Counter::default();
    let mut interp = started(
        "var i = 0;\nwhile (i < 3) {\n  highlightBlock('loop');\n  i++;\n}",
        Limits::default(),
    );

    for expected in 0..3 {
        assert_eq!(interp.tick(&mut host), stepped("loop"));
        let i = interp.machine().and_then(|m| m.variable("i")).cloned();
        assert_eq!(i, Some(Value::Number(expected as f64)));
    }
    assert_eq!(interp.tick(&mut host), TickReport::Finished);
    assert_eq!(interp.ticks(), 4);
}

#[test]
fn domain_violation_halts_and_keeps_the_highlight() {
    let mut host = Counter::default();
    let mut interp = started(
        "highlightBlock('a');\nfail();\nhighlightBlock('b');\nbump();",
        Limits::default(),
    );

    interp.tick(&mut host);
    let report = interp.tick(&mut host);
    assert_eq!(
        report,
        TickReport::Halted(Halt::DomainViolation("not allowed".into()))
    );
    assert_eq!(
        interp.state(),
        &RunState::Halted(Halt::DomainViolation("not allowed".into()))
    );
    assert_eq!(interp.highlighted(), Some("a"));

    // nothing after the violation ran, and further ticks do nothing
    assert_eq!(interp.tick(&mut host), TickReport::Idle);
    assert_eq!(host.count, 0.0);
}

#[test]
fn success_halts_the_run() {
    let mut host = Counter::default();
    let mut interp = started("highlightBlock('w');\nwin();\nbump();", Limits::default());

    let report = interp.run_to_completion(&mut host, 10);
    match report {
        TickReport::Halted(halt) => {
            assert!(halt.is_success());
            assert_eq!(halt.message(), "solved");
        }
        other => panic!("expected success, got {other:?}"),
    }
    assert_eq!(host.count, 0.0);
}

#[test]
fn start_while_running_is_ignored() {
    let mut host = Counter::default();
    let mut interp = started("highlightBlock('a');\nbump();", Limits::default());
    interp.tick(&mut host);

    let again = compile("win();", "other.js", SIGS).unwrap();
    assert_eq!(interp.start(again), StartOutcome::AlreadyRunning);
    assert_eq!(interp.highlighted(), Some("a"));
    assert_eq!(interp.tick(&mut host), TickReport::Finished);
    assert_eq!(host.calls, ["bump"]);
}

#[test]
fn start_after_halt_begins_a_fresh_run() {
    let mut host = Counter::default();
    let mut interp = started("fail();", Limits::default());
    assert!(matches!(interp.tick(&mut host), TickReport::Halted(_)));

    let program = compile("highlightBlock('x');\nbump();", "main.js", SIGS).unwrap();
    assert_eq!(interp.start(program), StartOutcome::Started);
    assert_eq!(interp.highlighted(), None);
    assert_eq!(interp.ticks(), 0);
    assert_eq!(interp.tick(&mut host), stepped("x"));
}

#[test]
fn stop_returns_to_idle_and_clears_the_highlight() {
    let mut host = Counter::default();
    let mut interp = started("highlightBlock('a');\nbump();", Limits::default());
    interp.tick(&mut host);

    interp.stop();
    assert_eq!(interp.state(), &RunState::Idle);
    assert_eq!(interp.highlighted(), None);
    assert!(interp.machine().is_none());
    assert_eq!(interp.tick(&mut host), TickReport::Idle);
    assert_eq!(host.count, 0.0);

    // stopping twice is harmless
    interp.stop();
    assert_eq!(interp.state(), &RunState::Idle);
}

#[test]
fn tick_while_idle_does_nothing() {
    let mut host = Counter::default();
    let mut interp = Interpreter::new(Limits::default());
    assert_eq!(interp.tick(&mut host), TickReport::Idle);
    assert!(host.calls.is_empty());
}

#[test]
fn tick_budget_yields_without_a_highlight() {
    let mut host = Counter::default();
    let limits = Limits {
        max_instructions: 1_000_000,
        tick_budget: 50,
    };
    let mut interp = started("while (true) {\n  bump();\n}", limits);

    assert_eq!(interp.tick(&mut host), TickReport::Stepped { block: None });
    assert!(interp.is_running());
    assert!(host.count > 0.0);
    assert_eq!(interp.machine().map(|m| m.executed()), Some(50));
}

#[test]
fn instruction_limit_faults_the_run() {
    let mut host = Counter::default();
    let limits = Limits {
        max_instructions: 100,
        tick_budget: 1_000,
    };
    let mut interp = started("while (true) {\n}", limits);

    match interp.tick(&mut host) {
        TickReport::Halted(Halt::Fault(message)) => {
            assert!(message.starts_with("main.js:"), "{message}");
            assert!(message.contains("instruction limit of 100 exceeded"), "{message}");
        }
        other => panic!("expected a fault, got {other:?}"),
    }
}

#[test]
fn host_argument_errors_fault_with_a_position() {
    let mut host = Counter::default();
    let mut interp = started("var s = 'a';\nset(s);", Limits::default());

    match interp.tick(&mut host) {
        TickReport::Halted(Halt::Fault(message)) => {
            assert!(message.starts_with("main.js:2:"), "{message}");
            assert!(
                message.ends_with("set: argument 0 must be a finite number, got 'a'"),
                "{message}"
            );
        }
        other => panic!("expected a fault, got {other:?}"),
    }
    assert_eq!(host.count, 0.0);
}

#[test]
fn accessors_feed_back_into_the_script() {
    let mut host = Counter::default();
    host.count = 4.0;
    let mut interp = started(
        "var doubled = count() * 2;\nif (doubled === 8) {\n  win();\n}",
        Limits::default(),
    );
    assert!(matches!(
        interp.run_to_completion(&mut host, 5),
        TickReport::Halted(Halt::Success(_))
    ));
}

#[test]
fn string_concatenation_and_math_builtins() {
    let mut host = Counter::default();
    let mut interp = started(
        "var label = 'x = ' + Math.max(1, 3);\nvar r = Math.round(2.6);\nhighlightBlock('end');",
        Limits::default(),
    );
    assert_eq!(interp.tick(&mut host), stepped("end"));
    let machine = interp.machine().unwrap();
    assert_eq!(machine.variable("label"), Some(&Value::from("x = 3")));
    assert_eq!(machine.variable("r"), Some(&Value::Number(3.0)));
}

#[test]
fn logical_operators_skip_the_right_hand_call() {
    let mut host = Counter::default();
    let mut interp = started(
        "set(0 && bump());\nset(2 || bump());\nset(count() && 7);\nset(0 || 9);",
        Limits::default(),
    );
    assert_eq!(interp.run_to_completion(&mut host, 5), TickReport::Finished);
    assert_eq!(host.calls, ["set", "set", "count", "set", "set"]);
    assert_eq!(host.count, 9.0);
}

#[test]
fn logical_operators_yield_the_deciding_operand() {
    let mut host = Counter::default();
    let mut interp = started(
        "var a = 0 && bump();\nvar b = '' || 'fallback';\nvar c = 'x' && 3;\nhighlightBlock('end');",
        Limits::default(),
    );
    assert_eq!(interp.tick(&mut host), stepped("end"));
    assert!(host.calls.is_empty());
    let machine = interp.machine().unwrap();
    assert_eq!(machine.variable("a"), Some(&Value::Number(0.0)));
    assert_eq!(machine.variable("b"), Some(&Value::from("fallback")));
    assert_eq!(machine.variable("c"), Some(&Value::Number(3.0)));
}

#[test]
fn halt_serializes_with_kind_and_message() {
    let json = serde_json::to_value(Halt::DomainViolation("walked off".into())).unwrap();
    assert_eq!(json["kind"], "domain_violation");
    assert_eq!(json["message"], "walked off");

    let state = serde_json::to_value(RunState::Running).unwrap();
    assert_eq!(state["state"], "running");
}
