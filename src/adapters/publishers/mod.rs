//! Concrete publishers
//!
//! - [`ConsolePublisher`] - collapsed failure summary on stderr
//! - [`JunitPublisher`] - JUnit XML report file
//! - [`JsonPublisher`] - JSON array of result records
//! - `WebhookPublisher` - HTTP delivery with backoff (feature `webhook`)

mod console;
mod json;
mod junit;
#[cfg(feature = "webhook")]
mod webhook;

pub use console::ConsolePublisher;
pub use json::JsonPublisher;
pub use junit::{JunitPublisher, SUITE_NAME};
#[cfg(feature = "webhook")]
pub use webhook::{NAMESPACE as WEBHOOK_NAMESPACE, WebhookPayload, WebhookPublisher};
