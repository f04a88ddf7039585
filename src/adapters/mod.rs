//! Adapters - concrete implementations of the core ports
//!
//! - [`checks`] - validations
//! - [`publishers`] - result delivery channels

pub mod checks;
pub mod publishers;
