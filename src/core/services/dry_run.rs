//! Dry run - which publishers would notify on which validations
//!
//! Every validation is assumed to fail; a hypothetical failure is built for
//! each (publisher, validation) pair and run through `will_publish`. Running
//! this before a real run surfaces missing enrichment without waiting for an
//! actual failure.

use std::cmp::Reverse;
use std::sync::Arc;

use crate::core::models::ValidationResult;
use crate::core::ports::{Publisher, Validation};

/// Validations one publisher would notify on
#[derive(Debug, Clone)]
pub struct DryRunEntry {
    /// The publisher
    pub publisher: Arc<dyn Publisher>,
    /// Validations it would publish, highest priority first
    pub validations: Vec<Arc<dyn Validation>>,
}

/// Publisher-to-validation associations of a dry run
#[derive(Debug, Clone, Default)]
pub struct DryRunPlan {
    /// One entry per publisher, in registration order
    pub entries: Vec<DryRunEntry>,
}

impl DryRunPlan {
    /// Entries ordered by descending publisher threshold
    ///
    /// Publishers without a threshold sort last.
    #[must_use]
    pub fn by_threshold(&self) -> Vec<&DryRunEntry> {
        let mut entries: Vec<&DryRunEntry> = self.entries.iter().collect();
        entries.sort_by_key(|e| Reverse(e.publisher.priority_threshold()));
        entries
    }

    /// Validations associated with the publisher at `index`
    #[must_use]
    pub fn validations_for(&self, index: usize) -> &[Arc<dyn Validation>] {
        self.entries.get(index).map(|e| e.validations.as_slice()).unwrap_or_default()
    }

    /// Validations no publisher would notify on
    #[must_use]
    pub fn unpublished<'a>(&self, validations: &'a [Arc<dyn Validation>]) -> Vec<&'a Arc<dyn Validation>> {
        validations
            .iter()
            .filter(|v| {
                !self
                    .entries
                    .iter()
                    .any(|e| e.validations.iter().any(|p| Arc::ptr_eq(p, v)))
            })
            .collect()
    }
}

/// Compute which validations each publisher would publish on failure
#[must_use]
pub fn compute_dry_run(
    validations: &[Arc<dyn Validation>],
    publishers: &[Arc<dyn Publisher>],
) -> DryRunPlan {
    let mut ordered: Vec<&Arc<dyn Validation>> = validations.iter().collect();
    ordered.sort_by_key(|v| Reverse(v.priority()));

    let entries = publishers
        .iter()
        .map(|publisher| {
            let validations = ordered
                .iter()
                .filter(|v| {
                    let hypothetical = ValidationResult::failure(v.name(), v, "failure");
                    publisher.will_publish(&hypothetical)
                })
                .map(|v| Arc::clone(v))
                .collect();
            DryRunEntry {
                publisher: Arc::clone(publisher),
                validations,
            }
        })
        .collect();

    DryRunPlan { entries }
}
