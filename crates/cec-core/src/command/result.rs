use serde::Serialize;

use super::{CecDevice, CommandKind};
use crate::error::{ErrorInfo, ErrorKind};

/// One `key: value` fragment returned by a send-command reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PayloadEntry {
    /// Requested argument name.
    pub key: String,
    /// Value extracted from the adapter reply.
    pub value: String,
}

impl PayloadEntry {
    /// Builds an entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Success data, one variant per command kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultData {
    /// `ListAdapters` reply.
    Adapters {
        /// Adapter names in reply order.
        #[serde(rename = "cecAdapters")]
        names: Vec<String>,
    },
    /// `Scan` reply.
    Devices {
        /// Devices in reply order.
        devices: Vec<CecDevice>,
    },
    /// `SendCommand` reply.
    SendCommand {
        /// Extracted fragments.
        payload: Vec<PayloadEntry>,
    },
    /// `GetConfig` reply.
    ConfigValue {
        /// Requested key.
        key: String,
        /// Extracted value.
        value: String,
    },
    /// `SetConfig` reply; carries no data.
    Applied {},
}

impl ResultData {
    /// Empty data appropriate for `kind`.
    #[must_use]
    pub const fn empty(kind: CommandKind) -> Self {
        match kind {
            CommandKind::ListAdapters => Self::Adapters { names: Vec::new() },
            CommandKind::Scan => Self::Devices {
                devices: Vec::new(),
            },
            CommandKind::SendCommand => Self::SendCommand {
                payload: Vec::new(),
            },
            CommandKind::GetConfig => Self::ConfigValue {
                key: String::new(),
                value: String::new(),
            },
            CommandKind::SetConfig => Self::Applied {},
        }
    }
}

/// Outcome delivered to a command's completion closure.
///
/// Exactly one of success data or error information is present; callers
/// distinguish "valid but empty" from "failed" through
/// [`is_success`](Self::is_success) alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    kind: CommandKind,
    outcome: Result<ResultData, ErrorInfo>,
}

impl CommandResult {
    /// Successful result carrying `data`.
    #[must_use]
    pub const fn success(kind: CommandKind, data: ResultData) -> Self {
        Self {
            kind,
            outcome: Ok(data),
        }
    }

    /// Successful result carrying the empty data for `kind`.
    #[must_use]
    pub const fn empty(kind: CommandKind) -> Self {
        Self::success(kind, ResultData::empty(kind))
    }

    /// Failed result using the error table entry for `error`.
    #[must_use]
    pub fn failure(kind: CommandKind, error: impl Into<ErrorInfo>) -> Self {
        Self {
            kind,
            outcome: Err(error.into()),
        }
    }

    /// Kind of the command this result answers.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Returns `true` when the command succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Success data, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&ResultData> {
        match &self.outcome {
            Ok(data) => Some(data),
            Err(_) => None,
        }
    }

    /// Error information, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorInfo> {
        match &self.outcome {
            Ok(_) => None,
            Err(error) => Some(error),
        }
    }

    /// Error classification, if the command failed.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(ErrorInfo::kind)
    }

    /// Splits the result into its outcome.
    #[must_use]
    pub fn into_outcome(self) -> Result<ResultData, ErrorInfo> {
        self.outcome
    }
}
