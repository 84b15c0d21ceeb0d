//! Entry point for the `cecd` binary.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use cecd::{ProcessAdapterProvider, StructuredHealthReporter, SystemConfigLoader, bootstrap_with};

fn main() -> ExitCode {
    let reporter = Arc::new(StructuredHealthReporter::new());
    let daemon = match bootstrap_with(&SystemConfigLoader, reporter, ProcessAdapterProvider) {
        Ok(daemon) => daemon,
        Err(error) => {
            // Telemetry may not be installed yet.
            drop(writeln!(io::stderr().lock(), "cecd: {error}"));
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    match daemon.serve(stdin.lock(), io::stdout()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: "cecd", %error, "request session failed");
            ExitCode::FAILURE
        }
    }
}
