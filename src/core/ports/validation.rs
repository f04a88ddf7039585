//! Validation port
//!
//! The check contract. A validation is a named, prioritised unit of work;
//! returning `Ok(())` from `perform` signals success, returning a
//! [`CheckError`] signals failure.

use std::time::Duration;

use crate::core::models::{Enrichment, EnrichmentValues, GroupFailures, Priority};
use crate::core::ports::Publisher;
use crate::error::{CheckError, EnrichmentFailure};

/// Attributes shared by every validation
#[derive(Debug, Clone)]
pub struct ValidationInfo {
    /// Display name (not guaranteed unique)
    pub name: String,

    /// Declared priority
    pub priority: Priority,

    /// Check-level timeout, if the check honours one
    pub timeout: Option<Duration>,

    /// Group whose failure ledger this validation contributes to
    pub group: Option<String>,

    /// Tier; lower orders run first
    pub order: i64,

    enrichment: Enrichment,
}

impl ValidationInfo {
    /// Create attributes with `Normal` priority, no group and order 0
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: Priority::Normal,
            timeout: None,
            group: None,
            order: 0,
            enrichment: Enrichment::new(),
        }
    }

    /// Set the priority
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the check-level timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the group
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the order
    #[must_use]
    pub const fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Attach enrichment data under `namespace`
    pub fn enrich(
        &mut self,
        namespace: &str,
        values: EnrichmentValues,
        force_namespace: bool,
    ) -> Result<&mut Self, EnrichmentFailure> {
        self.enrichment.enrich(&self.name, namespace, values, force_namespace)?;
        Ok(self)
    }

    /// Enrichment data visible to `namespace`
    #[must_use]
    pub fn enriched(&self, namespace: &str, force_namespace: bool) -> EnrichmentValues {
        self.enrichment.get(namespace, force_namespace)
    }

    /// The raw enrichment map
    #[must_use]
    pub const fn enrichment(&self) -> &Enrichment {
        &self.enrichment
    }
}

/// A unit of infrastructure assertion
pub trait Validation: Send + Sync + std::fmt::Debug {
    /// Shared attributes
    fn info(&self) -> &ValidationInfo;

    /// Shared attributes, mutably (construction and enrichment only)
    fn info_mut(&mut self) -> &mut ValidationInfo;

    /// Perform the check against a snapshot of earlier tiers' group failures
    fn perform(&self, group_failures: &GroupFailures) -> Result<(), CheckError>;

    /// More precise timing measured by the check itself
    ///
    /// `None` means unsupported; the runner then uses the wall-clock time
    /// measured around `perform`.
    fn elapsed_time(&self) -> Option<Duration> {
        None
    }

    /// Name of the metric timer this validation reports to, if any
    fn timer_name(&self) -> Option<String> {
        None
    }

    /// Short type label, used as JUnit classname
    fn kind(&self) -> &'static str {
        "validation"
    }

    /// Display name
    fn name(&self) -> &str {
        &self.info().name
    }

    /// Declared priority
    fn priority(&self) -> Priority {
        self.info().priority
    }

    /// Group, if any
    fn group(&self) -> Option<&str> {
        self.info().group.as_deref()
    }

    /// Tier
    fn order(&self) -> i64 {
        self.info().order
    }

    /// Attach enrichment data for `publisher`
    fn enrich(
        &mut self,
        publisher: &dyn Publisher,
        values: EnrichmentValues,
        force_namespace: bool,
    ) -> Result<(), EnrichmentFailure> {
        self.info_mut().enrich(publisher.namespace(), values, force_namespace)?;
        Ok(())
    }

    /// Enrichment data visible to `publisher`
    fn enriched(&self, publisher: &dyn Publisher, force_namespace: bool) -> EnrichmentValues {
        self.info().enriched(publisher.namespace(), force_namespace)
    }
}
