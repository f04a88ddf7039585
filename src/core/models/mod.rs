//! Domain models for vigil
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`Priority`] - How severe a failure is
//! - [`ValidationResult`] - "This validation passed/failed because..."
//! - [`Enrichment`] - Publisher-specific data attached to a validation
//! - [`GroupFailures`] - Failures recorded per group by earlier tiers

mod enrichment;
mod group_failures;
mod priority;
mod result;

pub use enrichment::{Enrichment, EnrichmentValues, GLOBAL_NAMESPACE};
pub use group_failures::GroupFailures;
pub use priority::{Priority, threshold_label};
pub use result::{MISSING_DESCRIPTION, Outcome, ResultRecord, ValidationResult};
