//! The CEC daemon.
//!
//! `cecd` loads its configuration through [`cec_config`], installs structured
//! telemetry, builds the handler chain (LG television profile in front of the
//! default handler driving the adapter tool) and then serves JSONL requests on
//! standard input. Every request line yields exactly one response line on
//! standard output; logs go to standard error.
//!
//! Health hooks emit structured events at each bootstrap stage so operators
//! can see where start-up stopped.

mod bootstrap;
pub mod frontend;
mod health;
pub mod telemetry;

pub use bootstrap::{
    AdapterProvider, BootstrapError, ConfigLoader, Daemon, ProcessAdapterProvider,
    StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use frontend::{FrontendError, SessionSummary};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
