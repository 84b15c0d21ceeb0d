//! Daemon bootstrap orchestration.

use std::io::{BufRead, Write};
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;
use tracing::warn;

use cec_config::{Config, ConfigError};
use cec_core::{
    CecController, DefaultHandler, HandlerRank, HardwareBoundary, LgTvHandler, ProcessAdapter,
};

use crate::frontend::{self, FrontendError, SessionSummary};
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

const BOOTSTRAP_TARGET: &str = "cecd::bootstrap";

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when no configuration can be resolved.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Builds the hardware boundary handed to the default handler.
pub trait AdapterProvider: Send + Sync {
    /// Returns the hardware boundary described by `config`.
    fn provide(&self, config: &Config) -> Box<dyn HardwareBoundary>;
}

/// Provider spawning the configured adapter tool per command.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessAdapterProvider;

impl AdapterProvider for ProcessAdapterProvider {
    fn provide(&self, config: &Config) -> Box<dyn HardwareBoundary> {
        Box::new(ProcessAdapter::new(
            config.adapter_command().as_std_path(),
            config.reply_timeout(),
        ))
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but holds unusable values.
    #[error("invalid configuration: {source}")]
    InvalidConfiguration {
        /// Validation failure.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: Config,
    controller: CecController,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Controller owning the handler chain.
    #[must_use]
    pub const fn controller(&self) -> &CecController {
        &self.controller
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Serves JSONL requests from `input` until end of input.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError`] when reading requests or writing responses
    /// fails.
    pub fn serve<R, W>(&self, input: R, output: W) -> Result<SessionSummary, FrontendError>
    where
        R: BufRead,
        W: Write + Send + 'static,
    {
        let summary = frontend::serve(&self.controller, input, output)?;
        self.reporter.session_closed(summary.requests);
        Ok(summary)
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// Registers the LG television handler and the default handler, then builds
/// the handler chain so the adapter queue is running before the first
/// request arrives.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration cannot be loaded or
/// validated, or when telemetry cannot be installed.
pub fn bootstrap_with<P>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    provider: P,
) -> Result<Daemon, BootstrapError>
where
    P: AdapterProvider,
{
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    if let Err(source) = config.validate() {
        let error = BootstrapError::InvalidConfiguration { source };
        reporter.bootstrap_failed(&error);
        return Err(error);
    }

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let controller = CecController::new();
    let factories = [
        (LgTvHandler::factory(), HandlerRank::LgTv),
        (
            DefaultHandler::factory(provider.provide(&config), config.default_adapter()),
            HandlerRank::Default,
        ),
    ];
    for (factory, rank) in factories {
        if !controller.register(factory, rank) {
            warn!(target: BOOTSTRAP_TARGET, %rank, "handler registration rejected");
        }
    }
    let complete = controller.initialize();
    reporter.handlers_ready(&controller.handler_ranks(), complete);
    reporter.bootstrap_succeeded(&config);

    Ok(Daemon {
        config,
        controller,
        telemetry,
        reporter,
    })
}
