//! blockplay runtime: the execution manager.
//!
//! A [`Session`] pairs a stepped interpreter with a task and drives it from
//! a tokio timer. Hosts start, stop and reset runs, change the tick
//! interval on the fly, and receive [`ExecutionEvent`]s (highlighted
//! blocks, halts, completion) in step order on an unbounded channel.
//!
//! [`RunConfig`] carries the session settings and loads from TOML.

mod config;
mod error;
mod session;

pub use config::{RunConfig, DEFAULT_INTERVAL_MS, MAX_INTERVAL_MS};
pub use error::{ConfigError, SessionError};
pub use session::{ExecutionEvent, Session};
