//! Group failure ledger
//!
//! Maps a group name to the ordered failure descriptions recorded for that
//! group by earlier tiers. Validations only ever see an immutable snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Failure descriptions per group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupFailures {
    groups: BTreeMap<String, Vec<String>>,
}

impl GroupFailures {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger with an empty list for every given group
    pub fn with_groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups.into_iter().map(|g| (g.into(), Vec::new())).collect(),
        }
    }

    /// Record a failure description for `group`
    pub fn record(&mut self, group: &str, description: impl Into<String>) {
        self.groups.entry(group.to_string()).or_default().push(description.into());
    }

    /// Failure descriptions recorded for `group`
    ///
    /// Unknown groups have no failures.
    #[must_use]
    pub fn get(&self, group: &str) -> &[String] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of failures recorded for `group`
    #[must_use]
    pub fn count(&self, group: &str) -> usize {
        self.get(group).len()
    }

    /// Whether `group` is tracked by this ledger
    #[must_use]
    pub fn contains(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    /// Iterate over `(group, failures)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(g, f)| (g.as_str(), f.as_slice()))
    }
}
