//! TOML run configuration.
//!
//! Every field is optional; missing fields take the playground defaults.
//!
//! ```toml
//! task = "maze"
//! interval_ms = 250
//! max_instructions = 1000000
//! tick_budget = 10000
//! seed = 42
//! maze = "levels/spiral.txt"
//! ```
//!
//! A relative `maze` path in a loaded file is resolved against the file's
//! directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use blockplay_interp::{Limits, DEFAULT_MAX_INSTRUCTIONS, DEFAULT_TICK_BUDGET};
use blockplay_tasks::TaskKind;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default delay between ticks.
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Longest accepted delay between ticks.
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Settings for one playground session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Which task the script plays.
    pub task: TaskKind,
    /// Milliseconds between ticks.
    pub interval_ms: u64,
    /// Instructions allowed per run.
    pub max_instructions: u64,
    /// Instructions allowed per tick.
    pub tick_budget: u32,
    /// Seed for the gradient target; random when absent.
    pub seed: Option<u64>,
    /// Maze layout file; the built-in layout when absent.
    pub maze: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            task: TaskKind::default(),
            interval_ms: DEFAULT_INTERVAL_MS,
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
            tick_budget: DEFAULT_TICK_BUDGET,
            seed: None,
            maze: None,
        }
    }
}

impl RunConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file. A relative `maze` path is taken
    /// relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            path: path.display().to_string(),
        })?;
        let mut config = Self::from_toml(&content)?;
        if let (Some(maze), Some(dir)) = (config.maze.as_mut(), path.parent()) {
            if maze.is_relative() {
                *maze = dir.join(&*maze);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms > MAX_INTERVAL_MS {
            return Err(ConfigError::Validation {
                message: format!(
                    "interval_ms must be at most {MAX_INTERVAL_MS}, got {}",
                    self.interval_ms
                ),
            });
        }
        if self.max_instructions == 0 {
            return Err(ConfigError::Validation {
                message: "max_instructions must be greater than 0".into(),
            });
        }
        if self.tick_budget == 0 {
            return Err(ConfigError::Validation {
                message: "tick_budget must be greater than 0".into(),
            });
        }
        Ok(())
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_instructions: self.max_instructions,
            tick_budget: self.tick_budget,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Read the configured maze layout, if any.
    pub fn maze_layout(&self) -> Result<Option<String>, ConfigError> {
        self.maze
            .as_deref()
            .map(|path| {
                std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    source,
                    path: path.display().to_string(),
                })
            })
            .transpose()
    }
}
