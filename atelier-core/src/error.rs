/// Structured error types for atelier-core.
///
/// Binary crates (atelier-cli) wrap these with `anyhow`, library consumers
/// (atelier-server) match on them.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for atelier-core operations
#[derive(Error, Debug)]
pub enum AtelierError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// JSON parsing or serialization failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// Required environment variable is unset or empty
    #[error("Missing required environment variable '{name}'")]
    MissingEnv { name: &'static str },

    /// Home directory could not be resolved for the credential store
    #[error("Could not determine home directory (set ATELIER_HOME)")]
    NoHomeDir,

    /// Credential file exists but is not usable
    #[error("Invalid credential file {path:?}: {reason}")]
    InvalidCredentials { path: PathBuf, reason: String },
}

/// Result type alias for atelier-core operations
pub type Result<T> = std::result::Result<T, AtelierError>;

impl AtelierError {
    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid credentials error
    pub fn invalid_credentials(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
