//! Console publisher
//!
//! Prints one collapsed alert summary per run to stderr, the way a chat
//! channel would receive it.

use colored::Colorize;

use crate::core::models::{Priority, ValidationResult};
use crate::core::ports::Publisher;
use crate::core::services::{collapse_failures, collapsed_summary};
use crate::error::PublishFailure;

/// Publishes a collapsed failure summary to stderr
#[derive(Debug, Clone)]
pub struct ConsolePublisher {
    name: String,
    environment: String,
    threshold: Option<Priority>,
}

impl ConsolePublisher {
    /// Create a console publisher for `environment`
    pub fn new(environment: impl Into<String>, threshold: Option<Priority>) -> Self {
        Self {
            name: "console".to_string(),
            environment: environment.into(),
            threshold,
        }
    }

    /// The summary this publisher would print, if anything failed
    #[must_use]
    pub fn render(&self, results: &[ValidationResult]) -> Option<String> {
        let eligible = results.iter().filter(|r| self.will_publish(r));
        collapsed_summary(&self.environment, &collapse_failures(eligible))
    }
}

impl Publisher for ConsolePublisher {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        "console"
    }

    fn priority_threshold(&self) -> Option<Priority> {
        self.threshold
    }

    fn send(&self, result: &ValidationResult) -> Result<(), PublishFailure> {
        self.send_batch(std::slice::from_ref(result))
    }

    fn send_batch(&self, results: &[ValidationResult]) -> Result<(), PublishFailure> {
        if let Some(summary) = self.render(results) {
            let mut lines = summary.lines();
            if let Some(header) = lines.next() {
                eprintln!("{}", header.red().bold());
            }
            for line in lines {
                eprintln!("{line}");
            }
        }
        Ok(())
    }
}
