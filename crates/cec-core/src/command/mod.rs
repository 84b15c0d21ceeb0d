//! Commands accepted by the controller and the results they complete with.
//!
//! A [`Command`] pairs a [`CommandPayload`] with a completion closure. The
//! closure is consumed by [`Command::complete`], so a command can be resolved
//! at most once; whichever handler claims it is responsible for calling
//! `complete` exactly once, either synchronously or from the queue worker.

mod device;
mod result;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::device::CecDevice;
pub use self::result::{CommandResult, PayloadEntry, ResultData};

/// Reply deadline applied to `SendCommand` when the caller supplies none.
pub const DEFAULT_REPLY_TIMEOUT_MS: u32 = 1000;

/// The five operations understood by the dispatch chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandKind {
    /// Enumerate local CEC adapters.
    ListAdapters,
    /// Discover devices on the CEC bus.
    Scan,
    /// Send a CEC sub-command to a device.
    SendCommand,
    /// Read an adapter configuration value.
    GetConfig,
    /// Write an adapter configuration value.
    SetConfig,
}

impl CommandKind {
    /// Returns the canonical method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListAdapters => "listAdapters",
            Self::Scan => "scan",
            Self::SendCommand => "sendCommand",
            Self::GetConfig => "getConfig",
            Self::SetConfig => "setConfig",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Scan request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// Adapter to scan; the handler's default applies when absent.
    #[serde(default)]
    pub adapter: Option<String>,
}

/// One argument of a CEC sub-command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CecCommandArg {
    /// Argument name.
    pub arg: String,
    /// Optional argument value.
    #[serde(default)]
    pub value: Option<String>,
}

impl CecCommandArg {
    /// Builds an argument without a value.
    #[must_use]
    pub fn named(arg: impl Into<String>) -> Self {
        Self {
            arg: arg.into(),
            value: None,
        }
    }

    /// Builds an argument carrying a value.
    #[must_use]
    pub fn with_value(arg: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            arg: arg.into(),
            value: Some(value.into()),
        }
    }

    /// Value as text, treating an absent value as empty.
    #[must_use]
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }
}

/// A named CEC sub-command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CecCommand {
    /// Sub-command name, e.g. `report-power-status`.
    pub name: String,
    /// Ordered arguments.
    #[serde(default)]
    pub args: Vec<CecCommandArg>,
}

impl CecCommand {
    /// Builds a sub-command.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<CecCommandArg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Send-command request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCommandRequest {
    /// Adapter carrying the command.
    #[serde(default)]
    pub adapter: Option<String>,
    /// Logical address of the destination device.
    pub dest_address: String,
    /// Reply deadline in milliseconds.
    #[serde(default = "default_timeout_ms", rename = "timeout")]
    pub timeout_ms: u32,
    /// Sub-command to send.
    pub command: CecCommand,
}

impl SendCommandRequest {
    /// Builds a request with the default adapter and timeout.
    #[must_use]
    pub fn new(dest_address: impl Into<String>, command: CecCommand) -> Self {
        Self {
            adapter: None,
            dest_address: dest_address.into(),
            timeout_ms: DEFAULT_REPLY_TIMEOUT_MS,
            command,
        }
    }
}

const fn default_timeout_ms() -> u32 {
    DEFAULT_REPLY_TIMEOUT_MS
}

/// Get-config request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetConfigRequest {
    /// Configuration key.
    pub key: String,
    /// Adapter to query.
    #[serde(default)]
    pub adapter: Option<String>,
}

/// Set-config request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetConfigRequest {
    /// Configuration key.
    pub key: String,
    /// New value.
    pub value: String,
    /// Adapter to configure.
    #[serde(default)]
    pub adapter: Option<String>,
}

/// Kind-specific request data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPayload {
    /// No parameters.
    ListAdapters,
    /// Bus scan.
    Scan(ScanRequest),
    /// CEC sub-command.
    SendCommand(SendCommandRequest),
    /// Configuration read.
    GetConfig(GetConfigRequest),
    /// Configuration write.
    SetConfig(SetConfigRequest),
}

impl CommandPayload {
    /// Kind implied by the payload variant.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::ListAdapters => CommandKind::ListAdapters,
            Self::Scan(_) => CommandKind::Scan,
            Self::SendCommand(_) => CommandKind::SendCommand,
            Self::GetConfig(_) => CommandKind::GetConfig,
            Self::SetConfig(_) => CommandKind::SetConfig,
        }
    }

    /// Adapter named by the request, if any.
    #[must_use]
    pub fn adapter(&self) -> Option<&str> {
        match self {
            Self::ListAdapters => None,
            Self::Scan(request) => request.adapter.as_deref(),
            Self::SendCommand(request) => request.adapter.as_deref(),
            Self::GetConfig(request) => request.adapter.as_deref(),
            Self::SetConfig(request) => request.adapter.as_deref(),
        }
    }
}

/// Completion closure invoked with the command's result.
pub type Completion = Box<dyn FnOnce(CommandResult) + Send + 'static>;

/// A request travelling through the handler chain.
pub struct Command {
    payload: CommandPayload,
    completion: Completion,
}

impl Command {
    /// Builds a command from its payload and completion closure.
    pub fn new<F>(payload: CommandPayload, completion: F) -> Self
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        Self {
            payload,
            completion: Box::new(completion),
        }
    }

    /// Kind of the command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.payload.kind()
    }

    /// Request data.
    #[must_use]
    pub const fn payload(&self) -> &CommandPayload {
        &self.payload
    }

    /// Mutable request data, for handlers that rewrite a command before
    /// passing it on.
    #[must_use]
    pub const fn payload_mut(&mut self) -> &mut CommandPayload {
        &mut self.payload
    }

    /// Consumes the command and invokes its completion closure.
    pub fn complete(self, result: CommandResult) {
        (self.completion)(result);
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Command")
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}
