//! Group validation
//!
//! A validation that judges the failure count of another group. Its priority
//! is not known until it runs: it escalates to the highest threshold tier
//! reached, and carries that priority on the failure it returns.

use crate::core::models::{GroupFailures, Priority};
use crate::core::ports::{Validation, ValidationInfo};
use crate::error::CheckError;

/// Default order of a group validation, after ordinary validations
pub const DEFAULT_GROUP_ORDER: i64 = 1;

/// Checks the number of failures recorded in a group
///
/// Thresholds are failure counts; `None` means "never reached". They are
/// clamped on construction so that `low <= normal <= critical`.
#[derive(Debug, Clone)]
pub struct GroupValidation {
    info: ValidationInfo,
    checked_group: String,
    low_threshold: Option<usize>,
    normal_threshold: Option<usize>,
    critical_threshold: Option<usize>,
}

impl GroupValidation {
    /// Create a group validation with no thresholds (it never fails)
    pub fn new(name: impl Into<String>, checked_group: impl Into<String>) -> Self {
        Self {
            info: ValidationInfo::new(name)
                .with_priority(Priority::Low)
                .with_order(DEFAULT_GROUP_ORDER),
            checked_group: checked_group.into(),
            low_threshold: None,
            normal_threshold: None,
            critical_threshold: None,
        }
    }

    /// Set all three thresholds, clamping them into ascending order
    #[must_use]
    pub fn with_thresholds(
        mut self,
        low: Option<usize>,
        normal: Option<usize>,
        critical: Option<usize>,
    ) -> Self {
        let normal = lowest(normal, critical);
        let low = lowest(low, normal);
        self.low_threshold = low;
        self.normal_threshold = normal;
        self.critical_threshold = critical;
        self
    }

    /// Set only the failing threshold
    #[must_use]
    pub fn with_low_threshold(self, low: usize) -> Self {
        let (normal, critical) = (self.normal_threshold, self.critical_threshold);
        self.with_thresholds(Some(low), normal, critical)
    }

    /// Set the order
    #[must_use]
    pub const fn with_order(mut self, order: i64) -> Self {
        self.info.order = order;
        self
    }

    /// Set the group this validation itself belongs to
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.info.group = Some(group.into());
        self
    }

    /// The group being judged
    #[must_use]
    pub fn checked_group(&self) -> &str {
        &self.checked_group
    }

    /// `(low, normal, critical)` after clamping
    #[must_use]
    pub const fn thresholds(&self) -> (Option<usize>, Option<usize>, Option<usize>) {
        (self.low_threshold, self.normal_threshold, self.critical_threshold)
    }

    /// Priority for a given failure count
    #[must_use]
    pub fn priority_for(&self, failures: usize) -> Priority {
        if reached(self.critical_threshold, failures) {
            Priority::Critical
        } else if reached(self.normal_threshold, failures) {
            Priority::Normal
        } else {
            Priority::Low
        }
    }
}

impl Validation for GroupValidation {
    fn info(&self) -> &ValidationInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ValidationInfo {
        &mut self.info
    }

    fn perform(&self, group_failures: &GroupFailures) -> Result<(), CheckError> {
        let messages = group_failures.get(&self.checked_group);
        let failures = messages.len();
        if !reached(self.low_threshold, failures) {
            return Ok(());
        }

        let mut reason = format!("Group {} had {failures} failures!", self.checked_group);
        for message in messages {
            reason.push_str("\n  - ");
            reason.push_str(message);
        }
        Err(CheckError::escalated(reason, self.priority_for(failures)))
    }

    fn kind(&self) -> &'static str {
        "group"
    }
}

fn lowest(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

fn reached(threshold: Option<usize>, failures: usize) -> bool {
    threshold.is_some_and(|t| failures >= t)
}
