//! Gradient task: climb a hidden mountain toward its peak.
//!
//! The learner only sees the current position and can probe heights with
//! `grad_objective`. Every move is validated before it is committed: a
//! position whose height drops below [`FLOOR_HEIGHT`] is refused.

use blockplay_interp::{expect_args, number_arg, CallOutcome, HostError, HostFunctions};
use blockplay_types::{FunctionSig, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::task::{Task, TaskKind, TaskSnapshot};

/// Height of the peak.
pub const MAX_HEIGHT: f64 = 100.0;
/// Divisor applied to the squared distance from the peak.
pub const SPREAD: f64 = 5000.0;
/// Moves that would end below this height are refused.
pub const FLOOR_HEIGHT: f64 = 50.0;
/// How close to [`MAX_HEIGHT`] counts as reaching the peak.
pub const TOLERANCE: f64 = 0.2;
/// Targets are drawn uniformly from `[-TARGET_RANGE / 2, TARGET_RANGE / 2)`.
pub const TARGET_RANGE: f64 = 500.0;

pub const WALKED_OFF: &str = "walked off the mountain";
pub const REACHED_PEAK: &str = "reached the highest point";

pub static FUNCTIONS: &[FunctionSig] = &[
    FunctionSig::accessor("grad_x_value", &[], "current x coordinate"),
    FunctionSig::accessor("grad_y_value", &[], "current y coordinate"),
    FunctionSig::accessor("grad_objective", &["x", "y"], "height at (x, y), without moving"),
    FunctionSig::accessor("grad_height", &[], "height at the current position"),
    FunctionSig::mutator("grad_set_x", &["x"], "move to a new x coordinate"),
    FunctionSig::mutator("grad_set_y", &["y"], "move to a new y coordinate"),
    FunctionSig::mutator("grad_update_x", &["dx"], "move along x by dx"),
    FunctionSig::mutator("grad_update_y", &["dy"], "move along y by dy"),
];

/// Height of the mountain at `(x, y)` when its peak is at `(tx, ty)`.
pub fn height(x: f64, y: f64, tx: f64, ty: f64) -> f64 {
    let (dx, dy) = (x - tx, y - ty);
    MAX_HEIGHT - (dx * dx + dy * dy) / SPREAD
}

/// Position and hidden target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientState {
    pub x: f64,
    pub y: f64,
    pub x_answer: f64,
    pub y_answer: f64,
}

impl GradientState {
    pub fn height(&self) -> f64 {
        self.height_at(self.x, self.y)
    }

    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        height(x, y, self.x_answer, self.y_answer)
    }

    pub fn is_at_peak(&self) -> bool {
        self.height() >= MAX_HEIGHT - TOLERANCE
    }
}

/// What the renderer needs to draw the gradient task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientSnapshot {
    #[serde(flatten)]
    pub state: GradientState,
    pub height: f64,
    pub reached_peak: bool,
}

/// The gradient task and its host functions.
#[derive(Debug, Clone)]
pub struct GradientTask {
    state: GradientState,
    rng: StdRng,
    reached_peak: bool,
}

impl GradientTask {
    /// A task at the origin with a target drawn from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut task = Self {
            state: GradientState {
                x: 0.0,
                y: 0.0,
                x_answer: 0.0,
                y_answer: 0.0,
            },
            rng: StdRng::seed_from_u64(seed),
            reached_peak: false,
        };
        task.new_target();
        task
    }

    /// A task at the origin with a fixed target.
    pub fn with_target(x_answer: f64, y_answer: f64) -> Self {
        let mut task = Self::new(0);
        task.state.x_answer = x_answer;
        task.state.y_answer = y_answer;
        task
    }

    pub fn state(&self) -> &GradientState {
        &self.state
    }

    /// Move without validation. Used to place the climber in tests and demos.
    pub fn place(&mut self, x: f64, y: f64) {
        self.state.x = x;
        self.state.y = y;
    }

    /// Validate the prospective state, then commit it.
    fn commit(&mut self, name: &str, next: GradientState) -> CallOutcome {
        let h = next.height();
        if h.is_nan() || h < FLOOR_HEIGHT {
            tracing::debug!(function = name, x = next.x, y = next.y, height = h, "move refused");
            return CallOutcome::DomainViolation(WALKED_OFF.to_string());
        }
        self.state = next;
        self.after_mutation()
    }

    /// Runs after every committed move.
    fn after_mutation(&mut self) -> CallOutcome {
        if !self.reached_peak && self.state.is_at_peak() {
            self.reached_peak = true;
            return CallOutcome::Success(REACHED_PEAK.to_string());
        }
        CallOutcome::Continue(Value::Undefined)
    }
}

impl HostFunctions for GradientTask {
    fn call(&mut self, name: &str, args: &[Value]) -> Result<CallOutcome, HostError> {
        let current = self.state;
        let outcome = match name {
            "grad_x_value" => {
                expect_args(name, args, 0)?;
                CallOutcome::Continue(Value::Number(current.x))
            }
            "grad_y_value" => {
                expect_args(name, args, 0)?;
                CallOutcome::Continue(Value::Number(current.y))
            }
            "grad_objective" => {
                expect_args(name, args, 2)?;
                let x = number_arg(name, args, 0)?;
                let y = number_arg(name, args, 1)?;
                CallOutcome::Continue(Value::Number(current.height_at(x, y)))
            }
            "grad_height" => {
                expect_args(name, args, 0)?;
                CallOutcome::Continue(Value::Number(current.height()))
            }
            "grad_set_x" | "grad_set_y" | "grad_update_x" | "grad_update_y" => {
                expect_args(name, args, 1)?;
                let v = number_arg(name, args, 0)?;
                let mut next = current;
                match name {
                    "grad_set_x" => next.x = v,
                    "grad_set_y" => next.y = v,
                    "grad_update_x" => next.x += v,
                    _ => next.y += v,
                }
                self.commit(name, next)
            }
            other => return Err(HostError::UnknownFunction(other.to_string())),
        };
        Ok(outcome)
    }
}

impl Task for GradientTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Gradient
    }

    fn begin_run(&mut self) {
        self.reached_peak = false;
    }

    /// Back to the origin; the target stays.
    fn reset(&mut self) {
        self.state.x = 0.0;
        self.state.y = 0.0;
        self.reached_peak = false;
    }

    fn new_target(&mut self) {
        self.state.x_answer = (self.rng.random::<f64>() - 0.5) * TARGET_RANGE;
        self.state.y_answer = (self.rng.random::<f64>() - 0.5) * TARGET_RANGE;
        tracing::debug!(
            x_answer = self.state.x_answer,
            y_answer = self.state.y_answer,
            "new target"
        );
    }

    fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot::Gradient(GradientSnapshot {
            state: self.state,
            height: self.state.height(),
            reached_peak: self.reached_peak,
        })
    }
}
