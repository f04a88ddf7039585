//! List configured validations and publishers

use std::path::Path;
use std::process::ExitCode;

use vigil::config::{Config, RunOverrides};
use vigil::output::{ListReport, OutputMode};

/// List the validations and publishers a configuration defines
pub fn list(config: Option<&Path>, environment: Option<String>, mode: OutputMode) -> anyhow::Result<ExitCode> {
    let (mut config, _) = Config::discover(config)?;
    config.apply_overrides(&RunOverrides {
        environment,
        ..RunOverrides::default()
    });

    let validations = config.build_validations()?;
    let publishers = config.build_publishers()?;
    ListReport::new(&validations, &publishers).render(mode);
    Ok(ExitCode::SUCCESS)
}
