use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Adapter name used when a request does not name one.
pub const DEFAULT_CEC_ADAPTER: &str = "cec0";

/// Reply timeout applied to adapter invocations, in milliseconds.
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 1000;

/// Adapter tool spawned for every hardware command.
pub const DEFAULT_ADAPTER_COMMAND: &str = "/usr/bin/cec-adapter";

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the daemon.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned default adapter name.
#[must_use]
pub fn default_adapter() -> String {
    DEFAULT_CEC_ADAPTER.to_owned()
}

/// Default reply timeout in milliseconds.
#[must_use]
pub const fn default_reply_timeout_ms() -> u64 {
    DEFAULT_REPLY_TIMEOUT_MS
}

/// Default path of the adapter tool.
#[must_use]
pub fn default_adapter_command() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_ADAPTER_COMMAND)
}
