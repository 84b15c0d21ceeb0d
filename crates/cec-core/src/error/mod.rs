//! Error taxonomy for command handling and the hardware boundary.
//!
//! [`ErrorKind`] is the user-visible classification carried by failed
//! command results; every kind maps to a fixed numeric code and message
//! through [`ErrorKind::code`] and [`ErrorKind::text`]. [`CecError`] covers
//! failures raised while talking to the adapter tool or the command queue and
//! collapses to [`ErrorKind::HardwareUnavailable`] when reported to callers.
//! I/O errors are wrapped in `Arc` to keep the error cheap to clone and
//! within the `result_large_err` budget.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

/// Classification of a failed command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Malformed or missing required fields in the inbound request.
    BadInput,
    /// Arguments do not satisfy the command contract.
    InvalidParameters,
    /// The CEC sub-command is not recognised.
    InvalidCommand,
    /// The named adapter is not present in the adapter registry.
    InvalidAdapter,
    /// The destination address has not been seen by a scan.
    InvalidDestination,
    /// The adapter did not answer or reported a non-success status.
    HardwareUnavailable,
    /// Anything else.
    #[default]
    Unknown,
}

impl ErrorKind {
    /// Numeric code reported to clients.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::BadInput => 1,
            Self::InvalidParameters => 2,
            Self::InvalidAdapter => 3,
            Self::InvalidDestination => 4,
            Self::InvalidCommand => 5,
            Self::HardwareUnavailable => 6,
            Self::Unknown => 12,
        }
    }

    /// Human-readable message reported to clients.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::BadInput => "The JSON input does not match the expected schema",
            Self::InvalidParameters => "Invalid input parameter",
            Self::InvalidAdapter => "CEC adapter not found",
            Self::InvalidDestination => "Destination device not found",
            Self::InvalidCommand => "Invalid CEC command",
            Self::HardwareUnavailable => "No response from the CEC adapter",
            Self::Unknown => "Unknown error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.text())
    }
}

/// Error code and text attached to a failed command result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    #[serde(skip)]
    kind: ErrorKind,
    error_code: i32,
    error_text: String,
}

impl ErrorInfo {
    /// Builds the table entry for `kind`.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            error_code: kind.code(),
            error_text: kind.text().to_owned(),
        }
    }

    /// Classification of the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Numeric error code.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.error_code
    }

    /// Human-readable error text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.error_text.as_str()
    }
}

impl From<ErrorKind> for ErrorInfo {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Failures raised by the hardware boundary and the command queue.
#[derive(Debug, Clone, Error)]
pub enum CecError {
    /// The adapter executable does not exist.
    #[error("adapter executable not found: {path}")]
    ExecutableNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The adapter process could not be spawned.
    #[error("adapter '{command}' failed to start: {message}")]
    SpawnFailed {
        /// Native command being issued.
        command: String,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying I/O error.
        #[source]
        source: Option<Arc<std::io::Error>>,
    },

    /// An I/O error occurred while exchanging lines with the adapter.
    #[error("I/O error running adapter command '{command}': {source}")]
    Io {
        /// Native command being issued.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The adapter did not finish within the reply deadline.
    #[error("adapter command '{command}' timed out after {timeout_ms}ms")]
    Timeout {
        /// Native command being issued.
        command: String,
        /// Deadline that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The adapter exited with a failure status.
    #[error("adapter command '{command}' exited with status {status}")]
    NonZeroExit {
        /// Native command being issued.
        command: String,
        /// Process exit status.
        status: i32,
    },

    /// A request exceeds the adapter's documented field limits.
    #[error("native command field '{field}' exceeds the adapter limit: {message}")]
    LimitExceeded {
        /// Offending field.
        field: String,
        /// Description of the violated limit.
        message: String,
    },

    /// The command queue has shut down and accepts no more work.
    #[error("command queue is closed")]
    QueueClosed,
}

impl CecError {
    /// Wraps an I/O error raised while running `command`.
    #[must_use]
    pub fn io(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            command: command.into(),
            source: Arc::new(source),
        }
    }

    /// Classification reported to callers when this error ends a command.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::LimitExceeded { .. } => ErrorKind::InvalidParameters,
            Self::ExecutableNotFound { .. }
            | Self::SpawnFailed { .. }
            | Self::Io { .. }
            | Self::Timeout { .. }
            | Self::NonZeroExit { .. }
            | Self::QueueClosed => ErrorKind::HardwareUnavailable,
        }
    }
}
