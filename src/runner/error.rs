//! Run-command error taxonomy and the notifications shown for it.

use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Please open a file!")]
    NoActiveDocument,

    #[error("Please open a .eui or .ewui file! (got {})", .0.display())]
    UnrecognizedExtension(PathBuf),

    #[error("EUI interpreter not found:\n{}\nPlace it in the extension root!", .0.display())]
    MissingInterpreterScript(PathBuf),

    #[error("Python interpreter not found! Install Python and add it to PATH.")]
    NoInterpreterFound,

    #[error("Launch failed: {0}")]
    LaunchFailure(String),

    #[error("Process exited with code: {0}")]
    NonZeroExit(i32),

    #[error("Runtime error: {0}")]
    RuntimeStderrWarning(String),
}

pub type RunResult<T> = Result<T, RunError>;

impl RunError {
    /// Stderr warnings leave the run going; everything else ends the attempt.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RunError::RuntimeStderrWarning(_))
    }

    pub fn notification(&self) -> Notification {
        if self.is_fatal() {
            Notification::error(self.to_string())
        } else {
            Notification::warning(self.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message the editor host should show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}
