//! Port traits (interfaces) for external collaborators
//!
//! The engine only ever talks to checks and notifiers through these two
//! traits. Concrete checks and publishers live in the `adapters` module.

mod publisher;
mod validation;

pub use publisher::Publisher;
pub use validation::{Validation, ValidationInfo};
