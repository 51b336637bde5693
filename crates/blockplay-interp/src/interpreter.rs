//! The stepped interpreter: the Idle → Running → Halted state machine.
//!
//! A host drives it by calling [`Interpreter::tick`] on a timer (or from a
//! browser animation loop). Each tick runs the script up to and including
//! the next highlight marker, so the block the learner sees highlighted is
//! always the one the next tick will execute.

use std::sync::Arc;

use blockplay_codegen::Program;
use serde::Serialize;

use crate::error::EvalError;
use crate::host::HostFunctions;
use crate::machine::{Machine, Signal, Step};

/// Default cap on instructions for one whole run.
pub const DEFAULT_MAX_INSTRUCTIONS: u64 = 1_000_000;

/// Default cap on instructions for one tick.
pub const DEFAULT_TICK_BUDGET: u32 = 10_000;

/// Execution limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Instructions allowed over a whole run before it faults.
    pub max_instructions: u64,
    /// Instructions a tick may run before yielding without a highlight.
    pub tick_budget: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
            tick_budget: DEFAULT_TICK_BUDGET,
        }
    }
}

/// Why a run stopped before the end of the script.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Halt {
    /// A task rule was broken, e.g. walking off the mountain.
    DomainViolation(String),
    /// The task was solved.
    Success(String),
    /// The script itself failed.
    Fault(String),
}

impl Halt {
    /// The text shown to the learner.
    pub fn message(&self) -> &str {
        match self {
            Halt::DomainViolation(m) | Halt::Success(m) | Halt::Fault(m) => m,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Halt::Success(_))
    }
}

/// Interpreter run state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "halt", rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Halted(Halt),
}

/// Result of [`Interpreter::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum StartOutcome {
    Started,
    /// A run is in progress; nothing changed.
    AlreadyRunning,
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickReport {
    /// Not running; nothing was executed.
    Idle,
    /// The run continues. `block` is the newly highlighted block, `None`
    /// when the tick budget ran out first.
    Stepped { block: Option<String> },
    /// The run halted during this tick.
    Halted(Halt),
    /// The script ran to its end; the interpreter is idle again.
    Finished,
}

/// Runs one compiled script at a time against a task's host functions.
#[derive(Debug, Default)]
pub struct Interpreter {
    state: RunState,
    machine: Option<Machine>,
    highlighted: Option<String>,
    limits: Limits,
    ticks: u64,
}

impl Interpreter {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// The block most recently reported by a highlight marker.
    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Ticks executed in the current (or last) run.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The machine of the current or last halted run.
    pub fn machine(&self) -> Option<&Machine> {
        self.machine.as_ref()
    }

    /// Begin running `program` from a clean machine.
    ///
    /// From Idle or Halted this discards any previous run. While Running it
    /// does nothing and returns [`StartOutcome::AlreadyRunning`].
    pub fn start(&mut self, program: impl Into<Arc<Program>>) -> StartOutcome {
        if self.is_running() {
            tracing::debug!("start ignored: already running");
            return StartOutcome::AlreadyRunning;
        }
        let program = program.into();
        tracing::info!(
            script = %program.name,
            instructions = program.len(),
            "run started"
        );
        self.machine = Some(Machine::new(program, self.limits.max_instructions));
        self.highlighted = None;
        self.ticks = 0;
        self.state = RunState::Running;
        StartOutcome::Started
    }

    /// Return to Idle and clear the highlight. Safe in any state.
    pub fn stop(&mut self) {
        if self.state != RunState::Idle {
            tracing::info!(ticks = self.ticks, "run stopped");
        }
        self.state = RunState::Idle;
        self.machine = None;
        self.highlighted = None;
    }

    /// Execute one block step against `host`.
    pub fn tick<H: HostFunctions + ?Sized>(&mut self, host: &mut H) -> TickReport {
        if !self.is_running() {
            return TickReport::Idle;
        }
        let Some(machine) = self.machine.as_mut() else {
            self.state = RunState::Idle;
            return TickReport::Idle;
        };
        self.ticks += 1;

        for _ in 0..self.limits.tick_budget.max(1) {
            let pc = machine.pc();
            match machine.step(host) {
                Ok(Step::Continue) => {}
                Ok(Step::Highlight(id)) => {
                    tracing::trace!(tick = self.ticks, block = %id, "highlight");
                    self.highlighted = Some(id.clone());
                    return TickReport::Stepped { block: Some(id) };
                }
                Ok(Step::Signal(Signal::DomainViolation(msg))) => {
                    return self.halt(Halt::DomainViolation(msg));
                }
                Ok(Step::Signal(Signal::Success(msg))) => {
                    return self.halt(Halt::Success(msg));
                }
                Ok(Step::End) => {
                    tracing::info!(
                        ticks = self.ticks,
                        instructions = machine.executed(),
                        "run finished"
                    );
                    self.state = RunState::Idle;
                    self.machine = None;
                    self.highlighted = None;
                    return TickReport::Finished;
                }
                Err(e) => {
                    let message = fault_message(machine, pc, &e);
                    return self.halt(Halt::Fault(message));
                }
            }
        }

        tracing::trace!(tick = self.ticks, "tick budget spent");
        TickReport::Stepped { block: None }
    }

    /// Tick until the run is no longer Running, at most `max_ticks` times.
    /// Returns the last report.
    pub fn run_to_completion<H: HostFunctions + ?Sized>(
        &mut self,
        host: &mut H,
        max_ticks: u64,
    ) -> TickReport {
        let mut last = TickReport::Idle;
        for _ in 0..max_ticks {
            last = self.tick(host);
            if !self.is_running() {
                break;
            }
        }
        last
    }

    fn halt(&mut self, halt: Halt) -> TickReport {
        tracing::info!(ticks = self.ticks, reason = ?halt, "run halted");
        self.state = RunState::Halted(halt.clone());
        TickReport::Halted(halt)
    }
}

/// `file:line:col: error`, or just the error when the position is unknown.
fn fault_message(machine: &Machine, pc: usize, error: &EvalError) -> String {
    match machine.span_at(pc) {
        Some(span) => format!("{}:{}: {}", machine.program().name, span, error),
        None => error.to_string(),
    }
}
