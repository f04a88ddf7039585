//! Worker side of process isolation
//!
//! A worker rebuilds the same validation list as its coordinator, performs
//! the single validation named by its request and prints the report.

use std::io::Write;
use std::sync::Arc;

use super::executor;
use super::protocol::{AttemptReport, WorkerRequest};
use crate::core::ports::Validation;
use crate::error::RunError;

/// Perform the validation a request names
pub fn serve(validations: &[Arc<dyn Validation>], request: &WorkerRequest) -> Result<AttemptReport, RunError> {
    let validation = validations.get(request.index).ok_or(RunError::UnknownValidation {
        index: request.index,
        count: validations.len(),
    })?;
    Ok(executor::perform(validation.as_ref(), &request.group_failures))
}

/// Serve a request and write the report line to `out`
pub fn serve_to(
    validations: &[Arc<dyn Validation>],
    request: &WorkerRequest,
    out: impl Write,
) -> Result<(), RunError> {
    serve(validations, request)?.write_to(out)
}
