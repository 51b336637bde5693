//! Timer-driven script runs.
//!
//! A [`Session`] owns one interpreter and one task behind a mutex. Starting
//! a script spawns a tokio task that sleeps for the current interval and
//! then ticks, until the run halts, finishes, or is cancelled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blockplay_interp::{Halt, Interpreter, Limits, RunState, StartOutcome, TickReport};
use blockplay_tasks::{build_task, Task, TaskSnapshot};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::RunConfig;
use crate::error::SessionError;

/// Reports a run delivers to the host, in step order.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    /// A block is now highlighted; it runs on the next tick.
    Highlight(String),
    /// The run halted: violation, success or fault.
    Halted(Halt),
    /// The script ran to its end.
    Finished,
}

struct Shared<T> {
    interp: Interpreter,
    task: T,
    /// Token of the active run's tick loop.
    run: Option<CancellationToken>,
    events: mpsc::UnboundedSender<ExecutionEvent>,
}

impl<T: Task> Shared<T> {
    fn cancel_run(&mut self) {
        if let Some(token) = self.run.take() {
            token.cancel();
        }
        self.interp.stop();
    }
}

/// An interpreter and a task, driven by a cancellable tick loop.
///
/// Cloning a session gives another handle to the same run.
pub struct Session<T: Task> {
    shared: Arc<Mutex<Shared<T>>>,
    interval_ms: Arc<AtomicU64>,
}

impl<T: Task> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            interval_ms: Arc::clone(&self.interval_ms),
        }
    }
}

impl<T: Task + 'static> Session<T> {
    /// A new idle session and the receiver for its events.
    pub fn new(
        task: T,
        limits: Limits,
        interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ExecutionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Self {
            shared: Arc::new(Mutex::new(Shared {
                interp: Interpreter::new(limits),
                task,
                run: None,
                events,
            })),
            interval_ms: Arc::new(AtomicU64::new(duration_ms(interval))),
        };
        (session, rx)
    }

    /// Compile `source` against the task and start running it.
    ///
    /// Does nothing and returns [`StartOutcome::AlreadyRunning`] while a run
    /// is in progress. Must be called from within a tokio runtime.
    pub fn start(&self, name: &str, source: &str) -> Result<StartOutcome, SessionError> {
        let mut shared = self.shared.lock();
        if shared.interp.is_running() {
            tracing::debug!(script = name, "start ignored: already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let program = blockplay_compiler::compile(source, name, shared.task.signatures())?;
        shared.task.begin_run();
        let outcome = shared.interp.start(program);

        let token = CancellationToken::new();
        if let Some(stale) = shared.run.replace(token.clone()) {
            stale.cancel();
        }
        tokio::spawn(tick_loop(
            Arc::clone(&self.shared),
            Arc::clone(&self.interval_ms),
            token,
        ));
        Ok(outcome)
    }

    /// Stop the current run. No further events are sent for it.
    pub fn stop(&self) {
        self.shared.lock().cancel_run();
    }

    /// Stop, then restore the task's initial state.
    pub fn reset(&self) {
        let mut shared = self.shared.lock();
        shared.cancel_run();
        shared.task.reset();
    }

    /// Stop, reset, and pick a new hidden target.
    pub fn new_target(&self) {
        let mut shared = self.shared.lock();
        shared.cancel_run();
        shared.task.reset();
        shared.task.new_target();
    }

    /// Change the delay between ticks. Applies from the next sleep on.
    pub fn set_interval(&self, interval: Duration) {
        self.interval_ms.store(duration_ms(interval), Ordering::Relaxed);
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::Relaxed))
    }

    pub fn state(&self) -> RunState {
        self.shared.lock().interp.state().clone()
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().interp.is_running()
    }

    pub fn highlighted(&self) -> Option<String> {
        self.shared.lock().interp.highlighted().map(str::to_string)
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.shared.lock().task.snapshot()
    }

    /// Read the task directly.
    pub fn with_task<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.lock().task)
    }
}

impl Session<Box<dyn Task>> {
    /// Build the configured task and an idle session for it.
    pub fn from_config(
        config: &RunConfig,
        seed: u64,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ExecutionEvent>), SessionError> {
        config.validate()?;
        let layout = config.maze_layout()?;
        let task = build_task(config.task, config.seed.unwrap_or(seed), layout.as_deref())?;
        Ok(Self::new(task, config.limits(), config.interval()))
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Sleep, tick, report; until the run ends or `token` is cancelled.
async fn tick_loop<T: Task>(
    shared: Arc<Mutex<Shared<T>>>,
    interval_ms: Arc<AtomicU64>,
    token: CancellationToken,
) {
    loop {
        let delay = Duration::from_millis(interval_ms.load(Ordering::Relaxed));
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
        if !tick_once(&shared, &token) {
            break;
        }
    }
    tracing::debug!("tick loop ended");
}

/// One locked tick. Returns whether the run continues.
fn tick_once<T: Task>(shared: &Mutex<Shared<T>>, token: &CancellationToken) -> bool {
    let mut guard = shared.lock();
    // stop() may have won the lock while this task was waking
    if token.is_cancelled() {
        return false;
    }
    let state = &mut *guard;
    let event = match state.interp.tick(&mut state.task) {
        TickReport::Idle => None,
        TickReport::Stepped { block } => block.map(ExecutionEvent::Highlight),
        TickReport::Halted(halt) => Some(ExecutionEvent::Halted(halt)),
        TickReport::Finished => Some(ExecutionEvent::Finished),
    };
    if let Some(event) = event {
        tracing::trace!(?event, "execution event");
        // the receiver may be gone; the run still completes
        let _ = state.events.send(event);
    }
    if state.interp.is_running() {
        return true;
    }
    state.run = None;
    false
}
