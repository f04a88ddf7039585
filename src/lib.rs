//! vigil - Infrastructure validation with priority-gated alerting
//!
//! This library runs black-box validations against live infrastructure and
//! fans the results out to publishers:
//!
//! - [`core`] - priorities, results, enrichment, the check and publisher
//!   contracts, group validations and the reporter
//! - [`engine`] - tiered, parallel, timeout-enforcing execution
//! - [`adapters`] - concrete checks and publishers
//! - [`config`] - TOML run configuration
//! - [`output`] - human and JSON rendering

// Deny all clippy warnings in this crate
#![deny(clippy::all, clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapters;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod output;

pub use crate::core::models::{Outcome, Priority, ValidationResult};
pub use crate::core::ports::{Publisher, Validation, ValidationInfo};
pub use crate::engine::{RunOptions, RunSummary, Runner, run_tests, run_tests_with};
pub use crate::error::{CheckError, PublishFailure, ReportingFailure, RunError};
