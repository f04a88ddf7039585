//! Business logic services
//!
//! Pure functions and types that orchestrate domain operations without
//! performing I/O themselves.

mod collapse;
mod dry_run;
mod group;
mod reporter;
mod retry;

pub use collapse::{CollapsedFailure, collapse_failures, collapsed_summary};
pub use dry_run::{DryRunEntry, DryRunPlan, compute_dry_run};
pub use group::{DEFAULT_GROUP_ORDER, GroupValidation};
pub use reporter::Reporter;
pub use retry::{Attempt, RetryPolicy};
