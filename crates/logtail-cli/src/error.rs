//! CLI-specific error types and exit codes.

use logtail_axum::ConfigError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (address in use, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Output could not be produced.
    #[error("Output error: {0}")]
    Output(String),

    /// The server stopped with an error.
    #[error("Server error: {0}")]
    Server(String),
}

impl CliError {
    /// Map error to an exit code (see sysexits.h).
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 78, // EX_CONFIG
            Self::Io(_) => 74,     // EX_IOERR
            Self::Output(_) => 70, // EX_SOFTWARE
            Self::Server(_) => 1,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(config) = err.downcast_ref::<ConfigError>() {
            Self::Config(config.to_string())
        } else if err.downcast_ref::<std::io::Error>().is_some() {
            Self::Io(format!("{err:#}"))
        } else {
            Self::Server(format!("{err:#}"))
        }
    }
}
