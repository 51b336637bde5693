//! Error types for configuration and sessions.

use blockplay_tasks::TaskError;
use blockplay_types::CompileErrors;

/// Errors while reading or validating a [`RunConfig`](crate::RunConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML is malformed or does not match the schema.
    #[error("failed to parse config TOML: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    /// The config parsed but holds an invalid value.
    #[error("config validation error: {message}")]
    Validation { message: String },

    /// A file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        source: std::io::Error,
        path: String,
    },
}

/// Errors from building or starting a [`Session`](crate::Session).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("script does not compile:\n{0}")]
    Compile(#[from] CompileErrors),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
