//! blockplay playground as a WASM module for browser environments.
//!
//! The browser owns the timer: it calls `tick()` every `interval_ms()`
//! milliseconds, highlights the reported block and redraws from
//! `snapshot()`.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { Playground } from 'blockplay-wasm';
//!
//! await init();
//!
//! const pg = new Playground("gradient", Math.random() * 2 ** 32);
//! const start = pg.start(workspaceCode);
//! if (!start.started) showErrors(start.errors);
//!
//! const timer = setInterval(() => {
//!   const step = pg.tick();
//!   if (step.kind === "stepped") workspace.highlightBlock(step.block);
//!   render(pg.snapshot());
//!   if (step.kind === "halted" || step.kind === "finished") clearInterval(timer);
//! }, pg.interval_ms());
//! ```

mod engine;

use blockplay_tasks::TaskKind;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use engine::{Engine, StartView, TickView, DEFAULT_INTERVAL_MS, SCRIPT_NAME};

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

fn parse_task(task: &str) -> Result<TaskKind, JsError> {
    task.parse().map_err(|e: blockplay_tasks::TaskError| JsError::new(&e.to_string()))
}

/// A task plus a stepped interpreter.
#[wasm_bindgen]
pub struct Playground {
    engine: Engine,
}

#[wasm_bindgen]
impl Playground {
    /// Create a playground for `task` (`"gradient"` or `"maze"`). `seed`
    /// picks the hidden target; `maze` is an optional layout text.
    #[wasm_bindgen(constructor)]
    pub fn new(task: &str, seed: f64, maze: Option<String>) -> Result<Playground, JsError> {
        let kind = parse_task(task)?;
        // JS numbers above 2^53 lose precision anyway
        let seed = seed.abs().trunc() as u64;
        let engine = Engine::new(kind, seed, maze.as_deref())
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Playground { engine })
    }

    /// Compile and start a script. Returns `{ started, already_running, errors }`.
    pub fn start(&mut self, source: &str) -> Result<JsValue, JsError> {
        to_js(&self.engine.start(source))
    }

    /// Run one block step. Returns `{ kind, block?, halt? }`.
    pub fn tick(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.engine.tick())
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    pub fn new_target(&mut self) {
        self.engine.new_target();
    }

    /// Task state for rendering.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(&self.engine.snapshot())
    }

    /// Id of the highlighted block, if any.
    pub fn highlighted(&self) -> Option<String> {
        self.engine.highlighted().map(str::to_string)
    }

    /// `{ state: "idle" | "running" | "halted", halt? }`
    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(self.engine.state())
    }

    pub fn interval_ms(&self) -> u32 {
        self.engine.interval_ms()
    }

    pub fn set_interval_ms(&mut self, ms: u32) {
        self.engine.set_interval_ms(ms);
    }
}

/// Check a script against a task without running it.
///
/// Returns a JSON string containing a `CompileResult`:
/// ```json
/// { "success": true, "instruction_count": 12, "variables": [], "blocks": ["a"],
///   "source_map": { "entries": [{ "instr": 0, "span": { "line": 1, "column": 1, ... } }] },
///   "errors": { "errors": [], "total_errors": 0 } }
/// ```
#[wasm_bindgen]
pub fn check(source: &str, task: &str) -> Result<String, JsError> {
    let kind = parse_task(task)?;
    let result = blockplay_compiler::compile_to_result(source, SCRIPT_NAME, kind.signatures());
    serde_json::to_string(&result).map_err(|e| JsError::new(&e.to_string()))
}

/// JSON table of the host functions a task exposes.
#[wasm_bindgen]
pub fn functions(task: &str) -> Result<String, JsError> {
    let kind = parse_task(task)?;
    Ok(blockplay_compiler::reference::generate_function_table(kind.signatures()))
}

/// Plain-text reference of a task's functions and the `Math` builtins.
#[wasm_bindgen]
pub fn reference(task: &str) -> Result<String, JsError> {
    let kind = parse_task(task)?;
    Ok(blockplay_compiler::reference::generate_reference(kind.name(), kind.signatures()))
}

/// Return the playground version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
