//! Domain error types

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while compiling a configuration into pipeline arguments.
/// No process is ever spawned when compilation fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{what} does not exist: \"{}\"", path.display())]
    PathNotFound { what: &'static str, path: PathBuf },

    #[error("Unsupported {field}: {value}")]
    UnsupportedOption { field: &'static str, value: String },
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),

    #[error("Session type is not set. Pass --session-type or set XDG_SESSION_TYPE (x11, wayland)")]
    MissingSessionType,
}
