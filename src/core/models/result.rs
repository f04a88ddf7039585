//! Validation results
//!
//! A result is created exactly once per performed validation. Priority and
//! timer name are copied from the validation at creation time so later
//! mutation of the validation cannot change what gets published.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Priority;
use crate::core::ports::Validation;

/// Description used when a failure is created without one
pub const MISSING_DESCRIPTION: &str = "validation failed without a description";

/// Whether a validation passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The validation passed
    Success,
    /// The validation failed
    Failure,
}

/// Outcome of performing one validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    test_name: String,
    validation: Arc<dyn Validation>,
    outcome: Outcome,
    description: Option<String>,
    time: Duration,
    time_refined: bool,
    priority: Priority,
    timer_name: Option<String>,
}

impl ValidationResult {
    fn new(
        test_name: impl Into<String>,
        validation: &Arc<dyn Validation>,
        outcome: Outcome,
        description: Option<String>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            validation: Arc::clone(validation),
            outcome,
            description,
            time: Duration::ZERO,
            time_refined: false,
            priority: validation.priority(),
            timer_name: validation.timer_name(),
        }
    }

    /// A passing result; the description is optional
    pub fn success(
        test_name: impl Into<String>,
        validation: &Arc<dyn Validation>,
        description: Option<String>,
    ) -> Self {
        Self::new(test_name, validation, Outcome::Success, description)
    }

    /// A failing result; an empty description is replaced by
    /// [`MISSING_DESCRIPTION`]
    pub fn failure(
        test_name: impl Into<String>,
        validation: &Arc<dyn Validation>,
        description: impl Into<String>,
    ) -> Self {
        let mut description = description.into();
        if description.trim().is_empty() {
            description = MISSING_DESCRIPTION.to_string();
        }
        Self::new(test_name, validation, Outcome::Failure, Some(description))
    }

    /// Set the elapsed time
    #[must_use]
    pub const fn with_time(mut self, time: Duration) -> Self {
        self.time = time;
        self
    }

    /// Override the priority copied from the validation
    ///
    /// Used when the priority was computed while performing.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Replace the time with a more precise measurement
    ///
    /// Only the first refinement is applied; returns whether it was.
    pub fn refine_time(&mut self, time: Duration) -> bool {
        if self.time_refined {
            return false;
        }
        self.time = time;
        self.time_refined = true;
        true
    }

    /// Name of the validation this result belongs to
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// The validation this result belongs to
    #[must_use]
    pub const fn validation(&self) -> &Arc<dyn Validation> {
        &self.validation
    }

    /// Success or failure
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Whether this result is a failure
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failure
    }

    /// Description of the outcome; always present for failures
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Elapsed time
    #[must_use]
    pub const fn time(&self) -> Duration {
        self.time
    }

    /// Priority at creation time
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Metric timer name at creation time
    #[must_use]
    pub fn timer_name(&self) -> Option<&str> {
        self.timer_name.as_deref()
    }

    /// Serializable snapshot of this result
    #[must_use]
    pub fn to_record(&self) -> ResultRecord {
        ResultRecord {
            name: self.test_name.clone(),
            kind: self.validation.kind().to_string(),
            outcome: self.outcome,
            description: self.description.clone(),
            time_secs: self.time.as_secs_f64(),
            priority: self.priority,
            group: self.validation.group().map(String::from),
            timer_name: self.timer_name.clone(),
        }
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Result: '{}', Description: '{}', Failure: {}, Priority: {}",
            self.test_name,
            self.description.as_deref().unwrap_or(""),
            self.is_failure(),
            self.priority
        )
    }
}

/// Serializable view of a [`ValidationResult`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Validation name
    pub name: String,
    /// Validation kind
    pub kind: String,
    /// Success or failure
    pub outcome: Outcome,
    /// Description, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Elapsed seconds
    pub time_secs: f64,
    /// Priority
    pub priority: Priority,
    /// Group, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Metric timer name, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_name: Option<String>,
}
