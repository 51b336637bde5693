//! Session tests on paused tokio time: event order, cancellation, reset and
//! interval changes.

use std::time::Duration;

use blockplay_interp::{Halt, Limits, RunState, StartOutcome};
use blockplay_runtime::{ExecutionEvent, RunConfig, Session, SessionError};
use blockplay_tasks::gradient::{REACHED_PEAK, WALKED_OFF};
use blockplay_tasks::{GradientTask, Task, TaskKind, TaskSnapshot};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

const CLIMB: &str = "\
while (true) {
  highlightBlock('step');
  grad_update_x(10);
}
";

fn gradient_session(
    tx: f64,
    interval_ms: u64,
) -> (Session<GradientTask>, UnboundedReceiver<ExecutionEvent>) {
    Session::new(
        GradientTask::with_target(tx, 0.0),
        Limits::default(),
        Duration::from_millis(interval_ms),
    )
}

/// Receive events until the run halts or finishes.
async fn collect_run(rx: &mut UnboundedReceiver<ExecutionEvent>) -> Vec<ExecutionEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let last = !matches!(event, ExecutionEvent::Highlight(_));
        events.push(event);
        if last {
            break;
        }
    }
    events
}

#[tokio::test(start_paused = true)]
async fn highlights_arrive_in_step_order() {
    let (session, mut rx) = gradient_session(100.0, 500);
    let source = "highlightBlock('a');\ngrad_update_y(1);\nhighlightBlock('b');\ngrad_update_y(1);";
    assert_eq!(session.start("main.js", source).unwrap(), StartOutcome::Started);

    assert_eq!(
        collect_run(&mut rx).await,
        [
            ExecutionEvent::Highlight("a".into()),
            ExecutionEvent::Highlight("b".into()),
            ExecutionEvent::Finished,
        ]
    );
    assert_eq!(session.state(), RunState::Idle);
    assert_eq!(session.with_task(|t| t.state().y), 2.0);
}

#[tokio::test(start_paused = true)]
async fn ticks_wait_for_the_interval() {
    let (session, mut rx) = gradient_session(100.0, 500);
    let started = tokio::time::Instant::now();
    let _ = session.start("main.js", CLIMB).unwrap();

    rx.recv().await;
    assert!(started.elapsed() >= Duration::from_millis(500));
    rx.recv().await;
    assert!(started.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn x_strictly_increases_until_success() {
    let (session, mut rx) = gradient_session(100.0, 500);
    let _ = session.start("climb.js", CLIMB).unwrap();

    let mut xs = Vec::new();
    let last = loop {
        let event = rx.recv().await.unwrap();
        xs.push(session.with_task(|t| t.state().x));
        if !matches!(event, ExecutionEvent::Highlight(_)) {
            break event;
        }
    };

    assert_eq!(last, ExecutionEvent::Halted(Halt::Success(REACHED_PEAK.into())));
    assert!(xs.len() > 2);
    assert!(xs.windows(2).all(|w| w[0] < w[1]), "{xs:?}");
}

#[tokio::test(start_paused = true)]
async fn walking_off_halts_and_keeps_the_highlight() {
    let (session, mut rx) = gradient_session(-100.0, 10);
    let _ = session.start("climb.js", CLIMB).unwrap();

    let events = collect_run(&mut rx).await;
    assert_eq!(
        events.last(),
        Some(&ExecutionEvent::Halted(Halt::DomainViolation(WALKED_OFF.into())))
    );
    assert_eq!(session.highlighted().as_deref(), Some("step"));
    assert!(matches!(session.state(), RunState::Halted(_)));
    assert_eq!(session.with_task(|t| t.state().x), 400.0);
}

#[tokio::test(start_paused = true)]
async fn stop_then_reset_restores_defaults_and_silences_events() {
    let (session, mut rx) = gradient_session(100.0, 500);
    let initial = session.snapshot();
    let _ = session.start("climb.js", CLIMB).unwrap();

    for _ in 0..3 {
        rx.recv().await.unwrap();
    }
    assert!(session.with_task(|t| t.state().x) > 0.0);

    session.stop();
    session.reset();
    while rx.try_recv().is_ok() {}

    assert_eq!(session.snapshot(), initial);
    assert_eq!(session.state(), RunState::Idle);
    assert_eq!(session.highlighted(), None);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(session.snapshot(), initial);
}

#[tokio::test(start_paused = true)]
async fn reset_alone_stops_the_run() {
    let (session, mut rx) = gradient_session(100.0, 500);
    let _ = session.start("climb.js", CLIMB).unwrap();
    rx.recv().await.unwrap();

    session.reset();
    while rx.try_recv().is_ok() {}
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(session.with_task(|t| t.state().x), 0.0);
}

#[tokio::test(start_paused = true)]
async fn start_while_running_is_a_no_op() {
    let (session, mut rx) = gradient_session(100.0, 500);
    assert_eq!(session.start("climb.js", CLIMB).unwrap(), StartOutcome::Started);
    rx.recv().await.unwrap();

    assert_eq!(
        session.start("climb.js", CLIMB).unwrap(),
        StartOutcome::AlreadyRunning
    );
    assert_eq!(session.state(), RunState::Running);

    // a second tick loop would double the step rate
    let before = session.with_task(|t| t.state().x);
    rx.recv().await.unwrap();
    assert_eq!(session.with_task(|t| t.state().x), before + 10.0);
}

#[tokio::test(start_paused = true)]
async fn interval_changes_do_not_change_the_steps() {
    let (steady, mut steady_rx) = gradient_session(100.0, 500);
    let _ = steady.start("climb.js", CLIMB).unwrap();
    let steady_events = collect_run(&mut steady_rx).await;

    let (varied, mut varied_rx) = gradient_session(100.0, 500);
    let _ = varied.start("climb.js", CLIMB).unwrap();
    let mut varied_events = Vec::new();
    for (i, ms) in [50, 2_000, 1, 500].into_iter().cycle().enumerate() {
        let event = varied_rx.recv().await.unwrap();
        let last = !matches!(event, ExecutionEvent::Highlight(_));
        varied_events.push(event);
        if last || i > 10_000 {
            break;
        }
        varied.set_interval(Duration::from_millis(ms));
    }

    assert_eq!(varied_events, steady_events);
    assert_eq!(varied.snapshot(), steady.snapshot());
}

#[tokio::test(start_paused = true)]
async fn compile_errors_are_returned_and_nothing_runs() {
    let (session, mut rx) = gradient_session(100.0, 500);
    let err = session.start("bad.js", "grad_fly(1);").unwrap_err();
    match err {
        SessionError::Compile(errors) => assert_eq!(errors.total_errors, 1),
        other => panic!("expected compile errors, got {other:?}"),
    }
    assert_eq!(session.state(), RunState::Idle);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test(start_paused = true)]
async fn new_target_moves_the_peak_and_resets_position() {
    let (session, _rx) = Session::new(
        GradientTask::new(1),
        Limits::default(),
        Duration::from_millis(500),
    );
    let before = session.with_task(|t| *t.state());
    session.new_target();
    let after = session.with_task(|t| *t.state());
    assert_ne!((before.x_answer, before.y_answer), (after.x_answer, after.y_answer));
    assert_eq!((after.x, after.y), (0.0, 0.0));
}

#[tokio::test(start_paused = true)]
async fn from_config_builds_the_configured_task() {
    let config = RunConfig {
        task: TaskKind::Maze,
        interval_ms: 20,
        ..RunConfig::default()
    };
    let (session, mut rx) = Session::from_config(&config, 0).unwrap();
    assert_eq!(session.with_task(|t| t.kind()), TaskKind::Maze);
    assert_eq!(session.interval(), Duration::from_millis(20));
    assert!(matches!(session.snapshot(), TaskSnapshot::Maze(_)));

    let _ = session
        .start("maze.js", "highlightBlock('go');\nmaze_move_forward();")
        .unwrap();
    assert_eq!(
        collect_run(&mut rx).await,
        [ExecutionEvent::Highlight("go".into()), ExecutionEvent::Finished]
    );
}
