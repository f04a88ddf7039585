//! Collapse failures sharing a description
//!
//! Several validations often fail for the same reason (one dead host behind
//! many checks). Chat-style publishers send one line per distinct
//! description instead of one message per failure.

use std::collections::HashMap;

use crate::core::models::ValidationResult;

/// Failures sharing one description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedFailure {
    /// The shared description
    pub description: String,
    /// Names of the failed validations, in result order
    pub names: Vec<String>,
}

impl CollapsedFailure {
    /// `(failed) a, b\nDescription: d`
    #[must_use]
    pub fn message(&self) -> String {
        format!("(failed) {}\nDescription: {}", self.names.join(", "), self.description)
    }
}

/// Group failing results by description, keeping first-seen order
///
/// Successes are ignored.
pub fn collapse_failures<'a, I>(results: I) -> Vec<CollapsedFailure>
where
    I: IntoIterator<Item = &'a ValidationResult>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut collapsed: Vec<CollapsedFailure> = Vec::new();

    for result in results.into_iter().filter(|r| r.is_failure()) {
        let description = result.description().unwrap_or_default().to_string();
        if let Some(&i) = index.get(&description) {
            collapsed[i].names.push(result.test_name().to_string());
        } else {
            index.insert(description.clone(), collapsed.len());
            collapsed.push(CollapsedFailure {
                description,
                names: vec![result.test_name().to_string()],
            });
        }
    }

    collapsed
}

/// Full summary message, or `None` when nothing failed
#[must_use]
pub fn collapsed_summary(environment: &str, collapsed: &[CollapsedFailure]) -> Option<String> {
    let errors: usize = collapsed.iter().map(|c| c.names.len()).sum();
    if errors == 0 {
        return None;
    }
    let body = collapsed.iter().map(CollapsedFailure::message).collect::<Vec<_>>().join("\n");
    Some(format!("{errors} failure(s) in {environment}:\n{body}"))
}
