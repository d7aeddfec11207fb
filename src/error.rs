//! Error taxonomy shared by every component.
//!
//! Every fallible library operation returns [`ShellError`]. The binary wraps
//! it in `anyhow` at the process boundary; the interactive loop reports it
//! and keeps going.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Error, Debug)]
pub enum ShellError {
    /// A precondition such as the API credential is missing.
    #[error("{0}")]
    Configuration(String),

    #[error("Command generation failed: {0}")]
    Generation(String),

    /// The subprocess ran but exited unsuccessfully.
    #[error("Command failed with {}", describe_exit(.code))]
    Execution {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Failed to save session to `{}`: {}", .path.display(), .reason)]
    Persist { path: PathBuf, reason: String },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to update shell configuration `{}`: {}", .path.display(), .source)]
    ShellConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a saved session could not be restored.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Session file `{}` does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("Could not read session file `{}`: {}", .path.display(), .source)]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file `{}` is malformed: {}", .path.display(), .source)]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

impl ShellError {
    pub fn persist(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Persist {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn shell_config(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ShellConfig {
            path: path.into(),
            source,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<rustyline::error::ReadlineError> for ShellError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        match err {
            rustyline::error::ReadlineError::Io(io) => Self::Io(io),
            other => Self::Terminal(other.to_string()),
        }
    }
}
