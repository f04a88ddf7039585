//! Execution engine
//!
//! Runs validations in ordered tiers, in parallel where configured, with
//! per-attempt timeouts. Attempts run on threads or in worker processes
//! behind the [`Launcher`] trait.

mod executor;
mod launcher;
mod protocol;
mod runner;
mod tiers;
mod worker;

pub use executor::{into_result, perform, timeout_result};
pub use launcher::{AttemptHandle, Launcher, ProcessLauncher, ThreadLauncher};
pub use protocol::{AttemptReport, WorkerRequest};
pub use runner::{RunOptions, RunSummary, Runner, run_tests, run_tests_with};
pub use tiers::{Tier, initial_ledger, partition_tiers};
pub use worker::{serve, serve_to};
