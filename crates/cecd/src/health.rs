//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use cec_config::Config;
use cec_core::HandlerRank;

use crate::bootstrap::BootstrapError;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the handler chain has been built.
    fn handlers_ready(&self, ranks: &[HandlerRank], complete: bool);

    /// Invoked when the front-end reaches end of input.
    fn session_closed(&self, requests: u64);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn handlers_ready(&self, ranks: &[HandlerRank], complete: bool) {
        (**self).handlers_ready(ranks, complete);
    }

    fn session_closed(&self, requests: u64) {
        (**self).session_closed(requests);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "cecd::health",
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "cecd::health",
            event = "bootstrap_succeeded",
            adapter_command = %config.adapter_command(),
            default_adapter = config.default_adapter(),
            reply_timeout_ms = config.reply_timeout_ms,
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "cecd::health",
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn handlers_ready(&self, ranks: &[HandlerRank], complete: bool) {
        let handlers: Vec<String> = ranks.iter().map(ToString::to_string).collect();
        if complete {
            tracing::info!(
                target: "cecd::health",
                event = "handlers_ready",
                ?handlers,
                "handler chain ready"
            );
        } else {
            tracing::warn!(
                target: "cecd::health",
                event = "handlers_degraded",
                ?handlers,
                "handler chain built with failures"
            );
        }
    }

    fn session_closed(&self, requests: u64) {
        tracing::info!(
            target: "cecd::health",
            event = "session_closed",
            requests,
            "input closed"
        );
    }
}
