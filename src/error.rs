//! Error types
//!
//! Every failure kind of a run has its own type so callers can tell a broken
//! check apart from a broken publisher or a broken configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::models::Priority;

/// Error returned from a validation's `perform`
///
/// Both variants become a Failure result; only `Failed` is the intentional
/// signalling path.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The check determined its target violates an expectation
    #[error("{reason}")]
    Failed {
        /// Human-readable cause
        reason: String,
        /// Priority computed while performing, overriding the declared one
        priority: Option<Priority>,
    },

    /// Anything else that went wrong while performing the check
    #[error("{0}")]
    Unexpected(String),

    /// I/O error while performing the check
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl CheckError {
    /// The explicit failure signal
    #[must_use]
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            priority: None,
        }
    }

    /// A failure whose priority was computed while performing
    #[must_use]
    pub fn escalated(reason: impl Into<String>, priority: Priority) -> Self {
        Self::Failed {
            reason: reason.into(),
            priority: Some(priority),
        }
    }

    /// Wrap an unexpected error
    #[must_use]
    pub fn unexpected(err: impl std::fmt::Display) -> Self {
        Self::Unexpected(err.to_string())
    }

    /// Priority override carried by this error, if any
    #[must_use]
    pub const fn priority(&self) -> Option<Priority> {
        match self {
            Self::Failed { priority, .. } => *priority,
            _ => None,
        }
    }
}

/// Writing to an already-populated enrichment namespace
#[derive(Debug, Clone, Error)]
#[error(
    "could not enrich validation '{validation}' for '{namespace}': namespace already written \
     (present: {present:?})"
)]
pub struct EnrichmentFailure {
    /// Namespace that was written twice
    pub namespace: String,
    /// Name of the validation being enriched
    pub validation: String,
    /// Namespaces present at the time of failure
    pub present: Vec<String>,
}

/// A publisher could not deliver
#[derive(Debug, Clone, Error)]
#[error("could not publish to {publisher}: {context}")]
pub struct PublishFailure {
    /// Name of the failing publisher
    pub publisher: String,
    /// What was being published and why it failed
    pub context: String,
}

impl PublishFailure {
    /// Create a publish failure
    #[must_use]
    pub fn new(publisher: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            publisher: publisher.into(),
            context: context.into(),
        }
    }
}

/// Aggregate of every publish failure of a report
#[derive(Debug, Clone, Error)]
pub struct ReportingFailure {
    /// Individual failures, in publisher registration order
    pub failures: Vec<PublishFailure>,
}

impl std::fmt::Display for ReportingFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} publisher(s) failed to publish:", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum RunError {
    /// A run needs at least one validation
    #[error("expected a non-empty list of validations")]
    NoValidations,

    /// Publishing partially failed
    #[error(transparent)]
    Reporting(#[from] ReportingFailure),

    /// Worker request referenced an unknown validation
    #[error("worker request for validation #{index}, but only {count} are configured")]
    UnknownValidation {
        /// Requested index
        index: usize,
        /// Number of configured validations
        count: usize,
    },

    /// Worker request or report could not be (de)serialized
    #[error("worker protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    /// I/O error on the worker channel
    #[error("worker io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file could be found
    #[error("no configuration file found (looked for {0:?})")]
    NotFound(Vec<PathBuf>),

    /// The file could not be read
    #[error("could not read {path}: {source}")]
    Read {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The selected environment does not exist
    #[error("environment '{0}' was not found in configuration")]
    UnknownEnvironment(String),

    /// A field holds an unusable value
    #[error("invalid value for {field}: {message}")]
    Invalid {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// Enrichment declared in the configuration conflicts
    #[error(transparent)]
    Enrichment(#[from] EnrichmentFailure),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::Invalid`]
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}
