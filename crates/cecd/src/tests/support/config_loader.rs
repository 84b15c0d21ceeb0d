//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};

use cec_config::Config;

use crate::bootstrap::ConfigLoader;

/// Loader returning a valid configuration pointing at a fake adapter tool.
pub(crate) struct TestConfigLoader {
    default_adapter: String,
}

impl TestConfigLoader {
    pub(crate) fn new() -> Self {
        Self {
            default_adapter: String::from("cec0"),
        }
    }

    /// Loader whose configuration fails validation.
    pub(crate) fn with_blank_adapter() -> Self {
        Self {
            default_adapter: String::from("  "),
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            adapter_command: Utf8PathBuf::from("/nonexistent/cec-adapter"),
            default_adapter: self.default_adapter.clone(),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an unparsable flag value.
pub(crate) struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("cecd"),
            OsString::from("--reply-timeout-ms"),
            OsString::from("soon"),
        ];
        Config::load_from_iter(args)
    }
}
