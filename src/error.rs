//! Error types for the CheerLights tweeter.
//!
//! Every failure surfaces synchronously to the immediate caller; nothing in
//! this crate catches and retries. The only deliberate exception is the
//! cornhole reducer, which logs and drops malformed broker messages so a bad
//! sensor payload cannot take down the subscriber loop.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tweeter operations
#[derive(Debug, Error)]
pub enum TweeterError {
    #[error("colour should be a string naming a known colour, got {found}")]
    InvalidType { found: &'static str },

    #[error("{0} is not a legal colour to choose")]
    InvalidColour(String),

    #[error("environment variable {0} missing")]
    MissingEnvironmentVariable(&'static str),

    #[error("access credentials file not found: {}", .0.display())]
    MissingAccessFile(PathBuf),

    #[error("malformed credentials file {}: {detail}", .path.display())]
    MalformedCredentialsFile { path: PathBuf, detail: String },

    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("unhandled choice {0:?}")]
    InvalidUserChoice(String),

    #[error("not connected to the twitter API")]
    NotConnected,

    #[error("tweet failed to send")]
    PostFailed,

    #[error("undefined template variable: {0}")]
    UndefinedVariable(String),

    #[error("template error: {0}")]
    Template(#[source] minijinja::Error),

    #[error("delete not confirmed: {0}")]
    DeleteFailed(String),

    #[error("twitter API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    #[error("oauth signing failed: {0}")]
    OAuth(String),

    #[error("mqtt error: {0}")]
    Mqtt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<minijinja::Error> for TweeterError {
    fn from(err: minijinja::Error) -> Self {
        // Strict-undefined violations get their own variant so callers can
        // tell a context mismatch apart from a bad template.
        if err.kind() == minijinja::ErrorKind::UndefinedError {
            TweeterError::UndefinedVariable(err.to_string())
        } else {
            TweeterError::Template(err)
        }
    }
}

/// Result type for tweeter operations
pub type TweeterResult<T> = Result<T, TweeterError>;
