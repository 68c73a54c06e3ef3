use std::io;
use std::string::FromUtf8Error;
use std::time::Duration;

/// Errors that can occur while splitting or running a command block
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed continuation: a comment hides the line continuation in `{line}`")]
    MalformedContinuation { line: String },

    #[error("Cannot tokenize `{line}`: {reason}")]
    Tokenize { line: String, reason: String },

    #[error("Command `{line}` failed: {source}")]
    Invocation {
        line: String,
        #[source]
        source: InvocationError,
    },

    #[error("Invalid usage: {0}")]
    Misuse(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// The logical line this error is attached to, if any
    pub fn line(&self) -> Option<&str> {
        match self {
            Error::MalformedContinuation { line }
            | Error::Tokenize { line, .. }
            | Error::Invocation { line, .. } => Some(line),
            _ => None,
        }
    }
}

/// Failure of a single process invocation
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("exited with status {code}")]
    NonZeroExit {
        code: i32,
        /// Captured standard error, when the primitive captured it
        stderr: Option<String>,
    },

    #[error("output is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),
}

impl InvocationError {
    /// Exit code of the failed process, if it ran at all
    pub fn code(&self) -> Option<i32> {
        match self {
            InvocationError::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias for runs operations
pub type Result<T> = std::result::Result<T, Error>;
