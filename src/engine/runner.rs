//! The validation runner
//!
//! Executes validations tier by tier, hands each tier a frozen snapshot of
//! the group-failure ledger, enforces the per-attempt timeout with retries,
//! collects results and finally publishes them through the reporter.
//!
//! An aborted attempt that is still executing (a check on a thread cannot be
//! stopped) keeps its slot: no retry of the same validation starts while it
//! runs, it counts against `processes`, and the tier does not end until it
//! has stopped.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::executor::{self, into_result, timeout_result};
use super::launcher::{AttemptHandle, Launcher, ThreadLauncher};
use super::tiers::{initial_ledger, partition_tiers};
use crate::core::models::{GroupFailures, ValidationResult};
use crate::core::ports::{Publisher, Validation};
use crate::core::services::{DryRunPlan, Reporter, compute_dry_run};
use crate::error::{ReportingFailure, RunError};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a run executes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum attempts in flight at once; 1 means sequential
    pub processes: usize,
    /// Per-attempt timeout; `None` disables enforcement
    pub timeout: Option<Duration>,
    /// Total attempts before a timed-out validation is recorded as failed
    pub timeout_attempts: u32,
    /// Only compute the dry-run plan
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            processes: 1,
            timeout: None,
            timeout_attempts: 1,
            dry_run: false,
        }
    }
}

/// What a run produced
#[derive(Debug)]
pub struct RunSummary {
    /// Publisher-to-validation associations, computed before executing
    pub plan: DryRunPlan,
    /// Results in completion order; empty for a dry run
    pub results: Vec<ValidationResult>,
    /// Whether validations were executed
    pub executed: bool,
    /// Publishers that failed while reporting
    pub publish_failure: Option<ReportingFailure>,
    /// Wall-clock time spent executing
    pub elapsed: Duration,
}

impl RunSummary {
    /// Number of failing results
    #[must_use]
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    /// Whether every validation passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures() == 0
    }

    /// Turn a publishing failure into an error
    pub fn into_result(self) -> Result<Self, RunError> {
        match self.publish_failure {
            Some(failure) => Err(RunError::Reporting(failure)),
            None => Ok(self),
        }
    }
}

/// Executes validations and reports their results
#[derive(Debug, Clone, Default)]
pub struct Runner {
    options: RunOptions,
    launcher: Option<Arc<dyn Launcher>>,
}

struct InFlight {
    index: usize,
    attempt: u32,
    started: Instant,
    handle: Box<dyn AttemptHandle>,
}

impl Runner {
    /// Create a runner
    #[must_use]
    pub const fn new(options: RunOptions) -> Self {
        Self { options, launcher: None }
    }

    /// Launcher used whenever attempts are scheduled (defaults to threads)
    #[must_use]
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// The options this runner was built with
    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run validations and publish their results
    ///
    /// Publishing failures do not abort the run; they are returned in
    /// [`RunSummary::publish_failure`].
    pub fn run(
        &self,
        validations: Vec<Arc<dyn Validation>>,
        publishers: Vec<Arc<dyn Publisher>>,
    ) -> Result<RunSummary, RunError> {
        if validations.is_empty() {
            return Err(RunError::NoValidations);
        }

        let plan = compute_dry_run(&validations, &publishers);
        log_plan(&plan, &validations);

        if self.options.dry_run {
            return Ok(RunSummary {
                plan,
                results: Vec::new(),
                executed: false,
                publish_failure: None,
                elapsed: Duration::ZERO,
            });
        }

        let start = Instant::now();
        let mut reporter = Reporter::new(publishers);
        self.execute(&validations, &mut reporter);
        let elapsed = start.elapsed();

        let publish_failure = reporter.report().err();
        Ok(RunSummary {
            plan,
            results: reporter.into_results(),
            executed: true,
            publish_failure,
            elapsed,
        })
    }

    /// Execute every tier, collecting results into `reporter`
    pub fn execute(&self, validations: &[Arc<dyn Validation>], reporter: &mut Reporter) {
        let mut ledger = initial_ledger(validations);

        for tier in partition_tiers(validations) {
            log::info!("Running tier {} ({} validation(s))", tier.order, tier.indices.len());
            let snapshot = Arc::new(ledger.clone());
            let results = self.execute_tier(validations, &tier.indices, &snapshot);

            for result in results {
                if result.is_failure() {
                    if let Some(group) = result.validation().group() {
                        ledger.record(group, result.description().unwrap_or_default());
                    }
                    log::info!("FAIL {}: {}", result.test_name(), result.description().unwrap_or_default());
                } else {
                    log::debug!("PASS {}", result.test_name());
                }
                reporter.collect(result);
            }
        }
    }

    fn execute_tier(
        &self,
        validations: &[Arc<dyn Validation>],
        indices: &[usize],
        snapshot: &Arc<GroupFailures>,
    ) -> Vec<ValidationResult> {
        let processes = self.options.processes.max(1);
        if processes == 1 && self.options.timeout.is_none() {
            return indices
                .iter()
                .map(|&i| into_result(&validations[i], executor::perform(validations[i].as_ref(), snapshot)))
                .collect();
        }

        let launcher: Arc<dyn Launcher> = match &self.launcher {
            Some(launcher) => Arc::clone(launcher),
            None => Arc::new(ThreadLauncher),
        };
        self.schedule(launcher.as_ref(), processes, validations, indices, snapshot)
    }

    fn schedule(
        &self,
        launcher: &dyn Launcher,
        width: usize,
        validations: &[Arc<dyn Validation>],
        indices: &[usize],
        snapshot: &Arc<GroupFailures>,
    ) -> Vec<ValidationResult> {
        let attempts = self.options.timeout_attempts.max(1);
        let mut queue: VecDeque<(usize, u32)> = indices.iter().map(|&i| (i, 1)).collect();
        let mut in_flight: Vec<InFlight> = Vec::with_capacity(width);
        let mut lingering: Vec<InFlight> = Vec::new();
        let mut results = Vec::with_capacity(indices.len());

        while !queue.is_empty() || !in_flight.is_empty() {
            lingering.retain_mut(|stale| stale.handle.is_running());

            while in_flight.len() + lingering.len() < width {
                let Some(position) = queue
                    .iter()
                    .position(|(index, _)| !lingering.iter().any(|stale| stale.index == *index))
                else {
                    break;
                };
                let Some((index, attempt)) = queue.remove(position) else {
                    break;
                };
                in_flight.push(InFlight {
                    index,
                    attempt,
                    started: Instant::now(),
                    handle: launcher.launch(index, &validations[index], snapshot),
                });
            }

            let mut progressed = false;
            let mut slot = 0;
            while slot < in_flight.len() {
                if let Some(report) = in_flight[slot].handle.poll() {
                    let done = in_flight.swap_remove(slot);
                    results.push(into_result(&validations[done.index], report));
                    progressed = true;
                    continue;
                }

                let expired = self
                    .options
                    .timeout
                    .filter(|&timeout| in_flight[slot].started.elapsed() >= timeout);
                if let Some(timeout) = expired {
                    let mut stale = in_flight.swap_remove(slot);
                    stale.handle.abort();
                    let validation = &validations[stale.index];
                    if stale.attempt < attempts {
                        log::warn!(
                            "'{}' timed out after {timeout:?} (attempt {}/{attempts}), retrying",
                            validation.name(),
                            stale.attempt
                        );
                        queue.push_front((stale.index, stale.attempt + 1));
                    } else {
                        log::warn!("'{}' timed out after {timeout:?}, giving up", validation.name());
                        results.push(timeout_result(validation, timeout, attempts));
                    }
                    if stale.handle.is_running() {
                        lingering.push(stale);
                    }
                    progressed = true;
                    continue;
                }

                slot += 1;
            }

            if !progressed {
                std::thread::sleep(POLL_INTERVAL);
            }
        }

        if !lingering.is_empty() {
            log::warn!(
                "Waiting for {} timed-out attempt(s) that could not be stopped",
                lingering.len()
            );
            for mut stale in lingering {
                stale.handle.wait();
            }
        }

        results
    }
}

/// Run validations with `options`; a publishing failure is an error
pub fn run_tests(
    validations: Vec<Arc<dyn Validation>>,
    publishers: Vec<Arc<dyn Publisher>>,
    options: RunOptions,
) -> Result<RunSummary, RunError> {
    Runner::new(options).run(validations, publishers)?.into_result()
}

/// [`run_tests`] with attempts started by `launcher`
///
/// `launcher` is used whenever attempts are scheduled, that is with more than
/// one process or with a timeout. Pass a [`ProcessLauncher`] to have
/// timed-out attempts killed instead of waited out.
///
/// [`ProcessLauncher`]: super::ProcessLauncher
pub fn run_tests_with(
    validations: Vec<Arc<dyn Validation>>,
    publishers: Vec<Arc<dyn Publisher>>,
    options: RunOptions,
    launcher: Arc<dyn Launcher>,
) -> Result<RunSummary, RunError> {
    Runner::new(options)
        .with_launcher(launcher)
        .run(validations, publishers)?
        .into_result()
}

fn log_plan(plan: &DryRunPlan, validations: &[Arc<dyn Validation>]) {
    for entry in plan.by_threshold() {
        log::debug!(
            "{} would publish {} validation(s)",
            entry.publisher.name(),
            entry.validations.len()
        );
        for validation in &entry.validations {
            log::debug!("  {} ({})", validation.name(), validation.priority());
        }
    }

    if plan.by_threshold().is_empty() {
        return;
    }
    let unpublished = plan.unpublished(validations);
    if !unpublished.is_empty() {
        let names: Vec<&str> = unpublished.iter().map(|v| v.name()).collect();
        log::warn!(
            "{} validation(s) would not be published anywhere: {}",
            names.len(),
            names.join(", ")
        );
    }
}
