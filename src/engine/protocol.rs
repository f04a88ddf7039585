//! Worker wire protocol
//!
//! The coordinator hands a worker process a [`WorkerRequest`] file and reads
//! back exactly one JSON [`AttemptReport`] line from its stdout. The same
//! report type is produced by in-process attempts, so both execution modes
//! build results the same way.

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::models::{GroupFailures, Outcome, Priority};
use crate::error::RunError;

/// What a worker should perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRequest {
    /// Index of the validation in the configured list
    pub index: usize,
    /// Snapshot of earlier tiers' group failures
    pub group_failures: GroupFailures,
}

impl WorkerRequest {
    /// Read a request from a JSON file
    pub fn read_from(path: &Path) -> Result<Self, RunError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Outcome of one attempt at performing a validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Success or failure
    pub outcome: Outcome,
    /// Failure description (or optional success note)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Wall-clock seconds measured around `perform`
    pub elapsed_secs: f64,
    /// More precise seconds reported by the validation itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precise_secs: Option<f64>,
    /// Priority computed while performing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl AttemptReport {
    /// A failed attempt that never reached `perform`'s result
    #[must_use]
    pub fn crashed(description: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            outcome: Outcome::Failure,
            description: Some(description.into()),
            elapsed_secs: elapsed.as_secs_f64(),
            precise_secs: None,
            priority: None,
        }
    }

    /// Write this report as one JSON line
    pub fn write_to(&self, mut out: impl Write) -> Result<(), RunError> {
        serde_json::to_writer(&mut out, self)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    /// Parse the last JSON line of a worker's stdout
    ///
    /// Anything a check printed before the report is ignored.
    pub fn read_last(input: impl BufRead) -> Result<Option<Self>, RunError> {
        let mut last = None;
        for line in input.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                last = Some(line);
            }
        }
        match last {
            Some(line) => Ok(Some(serde_json::from_str(&line)?)),
            None => Ok(None),
        }
    }
}
