//! Reporter - collects results and fans them out to publishers
//!
//! One broken channel must not silence the rest: every publisher is
//! attempted, and all publish failures are raised together afterwards.

use std::sync::Arc;

use crate::core::models::ValidationResult;
use crate::core::ports::Publisher;
use crate::error::ReportingFailure;

/// Collects the results of a run and publishes them
#[derive(Debug, Default)]
pub struct Reporter {
    publishers: Vec<Arc<dyn Publisher>>,
    results: Vec<ValidationResult>,
}

impl Reporter {
    /// Create a reporter for the given publishers
    #[must_use]
    pub const fn new(publishers: Vec<Arc<dyn Publisher>>) -> Self {
        Self {
            publishers,
            results: Vec::new(),
        }
    }

    /// Store a result for publishing (append-only, no dedup)
    pub fn collect(&mut self, result: ValidationResult) {
        self.results.push(result);
    }

    /// Results collected so far
    #[must_use]
    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    /// Registered publishers, in registration order
    #[must_use]
    pub fn publishers(&self) -> &[Arc<dyn Publisher>] {
        &self.publishers
    }

    /// Hand the collected results to every publisher
    ///
    /// Publishers are called in registration order. A failing publisher is
    /// logged and skipped; after all have been attempted, any failures are
    /// returned as one [`ReportingFailure`].
    pub fn report(&self) -> Result<(), ReportingFailure> {
        let mut failures = Vec::new();
        for publisher in &self.publishers {
            log::debug!(
                "Publishing {} result(s) to {}",
                self.results.len(),
                publisher.name()
            );
            if let Err(err) = publisher.send_batch(&self.results) {
                log::warn!("{err}");
                failures.push(err);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ReportingFailure { failures })
        }
    }

    /// Consume the reporter, returning the collected results
    #[must_use]
    pub fn into_results(self) -> Vec<ValidationResult> {
        self.results
    }
}
