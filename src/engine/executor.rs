//! Performing a single validation
//!
//! Wraps `perform` with wall-clock timing and panic capture, and turns the
//! resulting [`AttemptReport`] into a [`ValidationResult`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::protocol::AttemptReport;
use crate::core::models::{GroupFailures, Outcome, ValidationResult};
use crate::core::ports::Validation;
use crate::error::CheckError;

/// Perform `validation` once and report what happened
///
/// Never panics: a panicking check becomes a failure.
pub fn perform(validation: &dyn Validation, group_failures: &GroupFailures) -> AttemptReport {
    log::debug!("Performing '{}'", validation.name());
    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| validation.perform(group_failures)));
    let elapsed = start.elapsed();

    let (outcome, description, priority) = match outcome {
        Ok(Ok(())) => (Outcome::Success, None, None),
        Ok(Err(err)) => {
            if matches!(err, CheckError::Unexpected(_) | CheckError::Io(_)) {
                log::debug!("'{}' raised an unexpected error: {err}", validation.name());
            }
            let priority = err.priority();
            (Outcome::Failure, Some(err.to_string()), priority)
        },
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::warn!("'{}' panicked: {message}", validation.name());
            (Outcome::Failure, Some(format!("check panicked: {message}")), None)
        },
    };

    AttemptReport {
        outcome,
        description,
        elapsed_secs: elapsed.as_secs_f64(),
        precise_secs: validation.elapsed_time().map(|d| d.as_secs_f64()),
        priority,
    }
}

/// Build the result for an attempt report
#[must_use]
pub fn into_result(validation: &Arc<dyn Validation>, report: AttemptReport) -> ValidationResult {
    let result = match report.outcome {
        Outcome::Success => ValidationResult::success(validation.name(), validation, report.description),
        Outcome::Failure => {
            ValidationResult::failure(validation.name(), validation, report.description.unwrap_or_default())
        },
    };
    let mut result = result.with_time(seconds(report.elapsed_secs));
    if let Some(priority) = report.priority {
        result = result.with_priority(priority);
    }
    if let Some(precise) = report.precise_secs {
        result.refine_time(seconds(precise));
    }
    result
}

/// The synthetic failure recorded once every attempt timed out
#[must_use]
pub fn timeout_result(validation: &Arc<dyn Validation>, timeout: Duration, attempts: u32) -> ValidationResult {
    ValidationResult::failure(
        validation.name(),
        validation,
        format!("Validation timed out after {}s ({attempts} attempt(s))", timeout.as_secs_f64()),
    )
    .with_time(timeout)
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_default()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
