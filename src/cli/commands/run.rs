//! Run validations and publish the results

use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use vigil::config::Config;
use vigil::engine::{ProcessLauncher, Runner};
use vigil::output::{DryRunReport, OutputMode, RunReport};

use crate::cli::app::RunArgs;

/// Exit code when at least one validation failed
const EXIT_FAILURES: u8 = 1;

/// Exit code when a publisher could not deliver
const EXIT_PUBLISH: u8 = 3;

/// Run (or dry-run) the configured validations
pub fn run(args: &RunArgs, mode: OutputMode) -> anyhow::Result<ExitCode> {
    let (mut config, path) = Config::discover(args.config.as_deref())?;
    config.apply_overrides(&args.overrides());

    let validations = config.build_validations()?;
    let publishers = config.build_publishers()?;
    let options = config.run_options(args.dry_run)?;
    let environment = config.environment_name().to_string();

    let mut runner = Runner::new(options.clone());
    if (options.processes > 1 || options.timeout.is_some()) && !options.dry_run {
        runner = runner.with_launcher(Arc::new(worker_launcher(&path, &config)?));
    }

    log::info!(
        "Running {} validation(s) against {environment} ({} process(es))",
        validations.len(),
        options.processes
    );
    let summary = runner.run(validations.clone(), publishers)?;

    if !summary.executed {
        DryRunReport::from_plan(&environment, &summary.plan, &validations).render(mode);
        return Ok(ExitCode::SUCCESS);
    }

    RunReport::from_summary(&environment, &summary).render(mode);

    if summary.publish_failure.is_some() {
        Ok(ExitCode::from(EXIT_PUBLISH))
    } else if summary.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_FAILURES))
    }
}

/// Launcher re-executing this binary as `vigil worker`
fn worker_launcher(config_path: &Path, config: &Config) -> anyhow::Result<ProcessLauncher> {
    let config_path = std::path::absolute(config_path)?;
    let mut args: Vec<OsString> = vec!["worker".into(), "--config".into(), config_path.into_os_string()];
    if let Some(environment) = &config.run.environment {
        args.push("--environment".into());
        args.push(environment.into());
    }
    Ok(ProcessLauncher::current_exe(args)?)
}
