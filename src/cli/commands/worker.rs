//! Worker entry point for process-isolated attempts

use std::path::Path;
use std::process::ExitCode;

use vigil::config::{Config, RunOverrides};
use vigil::engine::{WorkerRequest, serve_to};

/// Perform the validation named by `request` and print its report
pub fn worker(config: &Path, environment: Option<String>, request: &Path) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(config)?;
    config.apply_overrides(&RunOverrides {
        environment,
        ..RunOverrides::default()
    });

    let validations = config.build_validations()?;
    let request = WorkerRequest::read_from(request)?;
    serve_to(&validations, &request, std::io::stdout().lock())?;
    Ok(ExitCode::SUCCESS)
}
