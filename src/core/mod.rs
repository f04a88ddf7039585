//! Core domain logic for vigil
//!
//! This module contains pure business logic with no I/O dependencies.
//! Checks and notifiers are abstracted through port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (Priority, ValidationResult, Enrichment, GroupFailures)
//! - `services/` - Business logic (Reporter, GroupValidation, dry run, collapsing, retry)
//! - `ports/` - Trait definitions for checks and publishers

pub mod models;
pub mod ports;
pub mod services;
