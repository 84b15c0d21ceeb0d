//! Shared doubles for the daemon test suites.

mod config_loader;
mod hardware;
mod reporter;

pub(crate) use self::config_loader::{FailingConfigLoader, TestConfigLoader};
pub(crate) use self::hardware::{MockAdapterProvider, ScriptedHardware, SharedBuffer};
pub(crate) use self::reporter::{HealthEvent, RecordingHealthReporter};
