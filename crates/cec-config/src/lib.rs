//! Layered configuration for the CEC daemon.
//!
//! Values are merged from defaults, an optional configuration file, `CECD_*`
//! environment variables, and command-line flags through `ortho_config`. The
//! resolved [`Config`] tells the daemon which adapter tool to spawn, which
//! adapter to assume when a request does not name one, how long to wait for a
//! reply, and how to emit logs.

mod defaults;
mod logging;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_ADAPTER_COMMAND, DEFAULT_CEC_ADAPTER, DEFAULT_LOG_FILTER, DEFAULT_REPLY_TIMEOUT_MS,
    default_adapter, default_adapter_command, default_log_filter, default_log_filter_string,
    default_log_format, default_reply_timeout_ms,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CECD")]
pub struct Config {
    /// Adapter tool executed for every hardware command.
    #[serde(default = "default_adapter_command")]
    pub adapter_command: Utf8PathBuf,
    /// Adapter assumed when a request omits one.
    #[serde(default = "default_adapter")]
    pub default_adapter: String,
    /// Reply deadline for adapter invocations, in milliseconds.
    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adapter_command: default_adapter_command(),
            default_adapter: default_adapter(),
            reply_timeout_ms: default_reply_timeout_ms(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Path of the adapter tool.
    #[must_use]
    pub fn adapter_command(&self) -> &Utf8Path {
        self.adapter_command.as_path()
    }

    /// Adapter assumed when a request omits one.
    #[must_use]
    pub fn default_adapter(&self) -> &str {
        self.default_adapter.as_str()
    }

    /// Reply deadline for adapter invocations.
    #[must_use]
    pub const fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    /// Configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Rejects values that load cleanly but cannot drive the daemon.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the adapter command or default adapter is
    /// blank, or the reply timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adapter_command.as_str().trim().is_empty() {
            return Err(ConfigError::EmptyAdapterCommand);
        }
        if self.default_adapter.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultAdapter);
        }
        if self.reply_timeout_ms == 0 {
            return Err(ConfigError::ZeroReplyTimeout);
        }
        Ok(())
    }
}

/// Semantic configuration errors detected after loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `adapter_command` was blank.
    #[error("adapter_command must not be empty")]
    EmptyAdapterCommand,
    /// `default_adapter` was blank.
    #[error("default_adapter must not be empty")]
    EmptyDefaultAdapter,
    /// `reply_timeout_ms` was zero.
    #[error("reply_timeout_ms must be greater than zero")]
    ZeroReplyTimeout,
}
