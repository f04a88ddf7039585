//! Publisher port
//!
//! The notifier contract. A publisher receives every result of a run and
//! decides per result whether it is eligible (priority threshold) and able
//! (enrichment present) to deliver it.

use crate::core::models::{Priority, ValidationResult};
use crate::error::PublishFailure;

/// A delivery channel for validation results
pub trait Publisher: Send + Sync + std::fmt::Debug {
    /// Display name
    fn name(&self) -> &str;

    /// Stable enrichment namespace of this publisher type
    fn namespace(&self) -> &str;

    /// Minimum priority to publish; `None` publishes everything
    fn priority_threshold(&self) -> Option<Priority>;

    /// Whether this publisher both should and can publish `result`
    fn will_publish(&self, result: &ValidationResult) -> bool {
        self.should_publish(result) && self.can_publish(result)
    }

    /// Whether `result` clears the priority threshold
    fn should_publish(&self, result: &ValidationResult) -> bool {
        result.priority().meets(self.priority_threshold())
    }

    /// Whether the result's validation carries what this publisher needs
    fn can_publish(&self, _result: &ValidationResult) -> bool {
        true
    }

    /// Publish a single result
    fn send(&self, _result: &ValidationResult) -> Result<(), PublishFailure> {
        Ok(())
    }

    /// Publish a whole run's results
    ///
    /// Calls [`Publisher::send`] once per result unless overridden.
    fn send_batch(&self, results: &[ValidationResult]) -> Result<(), PublishFailure> {
        for result in results {
            self.send(result)?;
        }
        Ok(())
    }
}
