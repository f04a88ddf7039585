//! JSON publisher
//!
//! Writes eligible results as a JSON array of result records.

use std::path::{Path, PathBuf};

use crate::core::models::{Priority, ResultRecord, ValidationResult};
use crate::core::ports::Publisher;
use crate::error::PublishFailure;

/// Writes results to a JSON file
#[derive(Debug, Clone)]
pub struct JsonPublisher {
    name: String,
    path: PathBuf,
    threshold: Option<Priority>,
}

impl JsonPublisher {
    /// Create a publisher writing to `path`
    pub fn new(path: impl Into<PathBuf>, threshold: Option<Priority>) -> Self {
        Self {
            name: "json".to_string(),
            path: path.into(),
            threshold,
        }
    }

    /// Output file location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records this publisher would write
    #[must_use]
    pub fn records(&self, results: &[ValidationResult]) -> Vec<ResultRecord> {
        results
            .iter()
            .filter(|r| self.will_publish(r))
            .map(ValidationResult::to_record)
            .collect()
    }
}

impl Publisher for JsonPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        "json"
    }

    fn priority_threshold(&self) -> Option<Priority> {
        self.threshold
    }

    fn send(&self, result: &ValidationResult) -> Result<(), PublishFailure> {
        self.send_batch(std::slice::from_ref(result))
    }

    fn send_batch(&self, results: &[ValidationResult]) -> Result<(), PublishFailure> {
        let content = serde_json::to_string_pretty(&self.records(results))
            .map_err(|e| PublishFailure::new(&self.name, e.to_string()))?;
        std::fs::write(&self.path, content)
            .map_err(|e| PublishFailure::new(&self.name, format!("{}: {e}", self.path.display())))
    }
}
