//! Gradient task tests: move validation, the success report and scripted
//! climbs through the interpreter.

use blockplay_interp::{CallOutcome, Halt, HostError, HostFunctions, Interpreter, Limits, TickReport};
use blockplay_tasks::gradient::{
    self, height, FLOOR_HEIGHT, MAX_HEIGHT, REACHED_PEAK, TARGET_RANGE, TOLERANCE, WALKED_OFF,
};
use blockplay_tasks::{GradientTask, Task, TaskSnapshot};
use blockplay_types::Value;
use proptest::prelude::*;

// ─── Strategies ─────────────────────────────────────────────────────────────

fn arb_target() -> impl Strategy<Value = (f64, f64)> {
    let half = TARGET_RANGE / 2.0;
    (-half..half, -half..half)
}

fn arb_mutator() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["grad_set_x", "grad_set_y", "grad_update_x", "grad_update_y"])
}

fn num(v: f64) -> [Value; 1] {
    [Value::Number(v)]
}

// ─── Properties ─────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn moves_below_the_floor_are_refused_and_leave_state_unchanged(
        (tx, ty) in arb_target(),
        mutator in arb_mutator(),
        v in -2000.0f64..2000.0,
    ) {
        let mut task = GradientTask::with_target(tx, ty);
        let before = *task.state();

        let (nx, ny) = match mutator {
            "grad_set_x" => (v, before.y),
            "grad_set_y" => (before.x, v),
            "grad_update_x" => (before.x + v, before.y),
            _ => (before.x, before.y + v),
        };
        let prospective = height(nx, ny, tx, ty);

        let outcome = task.call(mutator, &num(v)).unwrap();
        if prospective < FLOOR_HEIGHT {
            prop_assert_eq!(outcome, CallOutcome::DomainViolation(WALKED_OFF.into()));
            prop_assert_eq!(*task.state(), before);
        } else {
            prop_assert!(!matches!(outcome, CallOutcome::DomainViolation(_)));
            prop_assert_eq!((task.state().x, task.state().y), (nx, ny));
        }
    }

    #[test]
    fn near_the_peak_the_next_move_succeeds_exactly_once(
        (tx, ty) in arb_target(),
        (ox, oy) in (-22.0f64..22.0, -22.0f64..22.0),
        mutator in arb_mutator(),
    ) {
        let mut task = GradientTask::with_target(tx, ty);
        task.place(tx + ox, ty + oy);
        prop_assert!(task.state().height() >= MAX_HEIGHT - TOLERANCE);

        // a zero step keeps the position for the update functions
        let arg = match mutator {
            "grad_set_x" => tx + ox,
            "grad_set_y" => ty + oy,
            _ => 0.0,
        };
        let first = task.call(mutator, &num(arg)).unwrap();
        prop_assert_eq!(first, CallOutcome::Success(REACHED_PEAK.into()));
        let second = task.call(mutator, &num(arg)).unwrap();
        prop_assert_eq!(second, CallOutcome::Continue(Value::Undefined));
    }

    #[test]
    fn accessors_never_change_state((tx, ty) in arb_target(), x in -300.0f64..300.0, y in -300.0f64..300.0) {
        let mut task = GradientTask::with_target(tx, ty);
        let before = *task.state();
        let probe = task
            .call("grad_objective", &[Value::Number(x), Value::Number(y)])
            .unwrap();
        prop_assert_eq!(probe, CallOutcome::Continue(Value::Number(height(x, y, tx, ty))));
        task.call("grad_x_value", &[]).unwrap();
        task.call("grad_height", &[]).unwrap();
        prop_assert_eq!(*task.state(), before);
    }
}

// ─── Host function details ──────────────────────────────────────────────────

#[test]
fn begin_run_rearms_the_success_report() {
    let mut task = GradientTask::with_target(0.0, 0.0);
    assert_eq!(
        task.call("grad_update_x", &num(0.0)).unwrap(),
        CallOutcome::Success(REACHED_PEAK.into())
    );
    task.begin_run();
    assert_eq!(
        task.call("grad_update_y", &num(0.0)).unwrap(),
        CallOutcome::Success(REACHED_PEAK.into())
    );
}

#[test]
fn bad_arguments_are_host_errors() {
    let mut task = GradientTask::with_target(0.0, 0.0);
    assert!(matches!(
        task.call("grad_set_x", &[Value::from("far")]),
        Err(HostError::InvalidArgument { .. })
    ));
    assert!(matches!(
        task.call("grad_set_x", &num(f64::INFINITY)),
        Err(HostError::InvalidArgument { .. })
    ));
    assert!(matches!(
        task.call("grad_objective", &num(1.0)),
        Err(HostError::ArgumentCount { expected: 2, got: 1, .. })
    ));
    assert_eq!(
        task.call("grad_jump", &[]),
        Err(HostError::UnknownFunction("grad_jump".into()))
    );
}

#[test]
fn snapshot_serializes_position_and_height() {
    let mut task = GradientTask::with_target(30.0, 40.0);
    task.place(30.0, 0.0);
    let json = serde_json::to_value(task.snapshot()).unwrap();
    assert_eq!(json["task"], "gradient");
    assert_eq!(json["x"], 30.0);
    assert_eq!(json["y_answer"], 40.0);
    assert_eq!(json["height"], MAX_HEIGHT - 1600.0 / 5000.0);
    assert_eq!(json["reached_peak"], false);
    assert!(matches!(task.snapshot(), TaskSnapshot::Gradient(_)));
}

// ─── Scripted climbs ────────────────────────────────────────────────────────

const CLIMB_RIGHT: &str = "\
while (true) {
  highlightBlock('step');
  grad_update_x(10);
}
";

/// Tick `source` to a halt, recording x after every tick.
fn climb(task: &mut GradientTask, source: &str) -> (Vec<f64>, TickReport) {
    let program = blockplay_compiler::compile(source, "climb.js", gradient::FUNCTIONS).unwrap();
    let mut interp = Interpreter::new(Limits::default());
    task.begin_run();
    let _ = interp.start(program);

    let mut xs = Vec::new();
    for _ in 0..1_000 {
        let report = interp.tick(task);
        xs.push(task.state().x);
        if !interp.is_running() {
            return (xs, report);
        }
    }
    panic!("script did not halt");
}

#[test]
fn climbing_toward_the_peak_increases_x_until_success() {
    let mut task = GradientTask::with_target(100.0, 0.0);
    let (xs, report) = climb(&mut task, CLIMB_RIGHT);

    assert!(xs.windows(2).all(|w| w[0] <= w[1]));
    let mut distinct = xs.clone();
    distinct.dedup();
    assert!(distinct.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(report, TickReport::Halted(Halt::Success(REACHED_PEAK.into())));
    assert!(task.state().is_at_peak());
}

#[test]
fn climbing_away_from_the_peak_walks_off() {
    let mut task = GradientTask::with_target(-100.0, 0.0);
    let (xs, report) = climb(&mut task, CLIMB_RIGHT);

    assert_eq!(report, TickReport::Halted(Halt::DomainViolation(WALKED_OFF.into())));
    // the refused step is not committed
    assert_eq!(task.state().x, 400.0);
    assert_eq!(xs.last(), Some(&400.0));
    assert!(task.state().height() >= FLOOR_HEIGHT);
}

#[test]
fn probing_script_finds_the_peak() {
    let source = "\
var step = 16;
while (step > 0.01) {
  highlightBlock('probe');
  if (grad_objective(grad_x_value() + step, grad_y_value()) > grad_height()) {
    grad_update_x(step);
  } else if (grad_objective(grad_x_value() - step, grad_y_value()) > grad_height()) {
    grad_update_x(-step);
  } else if (grad_objective(grad_x_value(), grad_y_value() + step) > grad_height()) {
    grad_update_y(step);
  } else if (grad_objective(grad_x_value(), grad_y_value() - step) > grad_height()) {
    grad_update_y(-step);
  } else {
    step = step / 2;
  }
}
";
    let mut task = GradientTask::with_target(123.0, -87.0);
    let (_, report) = climb(&mut task, source);
    assert_eq!(report, TickReport::Halted(Halt::Success(REACHED_PEAK.into())));
}
