//! Webhook publisher
//!
//! POSTs one JSON payload per eligible failure. Validations must carry the
//! enrichment keys the endpoint requires (routing keys, team names) under
//! the `webhook` namespace; validations without them cannot be published.

use reqwest::StatusCode;
use serde::Serialize;

use crate::core::models::{EnrichmentValues, Priority, ValidationResult};
use crate::core::ports::Publisher;
use crate::core::services::{Attempt, RetryPolicy};
use crate::error::PublishFailure;

/// Enrichment namespace of webhook publishers
pub const NAMESPACE: &str = "webhook";

/// Posts failures to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct WebhookPublisher {
    name: String,
    url: String,
    environment: String,
    threshold: Option<Priority>,
    required_enrichment: Vec<String>,
    retry: RetryPolicy,
}

/// Body posted per failure
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    /// Environment the run targeted
    pub environment: &'a str,
    /// Validation name
    pub name: &'a str,
    /// Failure description
    pub description: &'a str,
    /// Result priority
    pub priority: Priority,
    /// Validation group, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<&'a str>,
    /// Enrichment data visible to this publisher
    pub enrichment: EnrichmentValues,
}

impl WebhookPublisher {
    /// Create a publisher posting to `url`
    pub fn new(url: impl Into<String>, environment: impl Into<String>, threshold: Option<Priority>) -> Self {
        Self {
            name: "webhook".to_string(),
            url: url.into(),
            environment: environment.into(),
            threshold,
            required_enrichment: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Keys every published validation must be enriched with
    #[must_use]
    pub fn with_required_enrichment(mut self, keys: Vec<String>) -> Self {
        self.required_enrichment = keys;
        self
    }

    /// Backoff policy for transient delivery errors
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Payload posted for `result`
    #[must_use]
    pub fn payload<'a>(&'a self, result: &'a ValidationResult) -> WebhookPayload<'a> {
        WebhookPayload {
            environment: &self.environment,
            name: result.test_name(),
            description: result.description().unwrap_or_default(),
            priority: result.priority(),
            group: result.validation().group(),
            enrichment: result.validation().enriched(self, false),
        }
    }

    fn post_all(&self, results: &[&ValidationResult]) -> Result<(), PublishFailure> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PublishFailure::new(&self.name, format!("could not start runtime: {e}")))?;
        let client = reqwest::Client::new();

        let failed: Vec<PublishFailure> = results
            .iter()
            .filter_map(|result| {
                let payload = self.payload(result);
                self.retry
                    .execute(|attempt| {
                        log::debug!("Posting '{}' to {} (attempt {})", result.test_name(), self.url, attempt + 1);
                        let response = runtime.block_on(client.post(&self.url).json(&payload).send());
                        classify(&self.name, result.test_name(), response)
                    })
                    .err()
            })
            .collect();
        combine(&self.name, failed)
    }
}

fn classify(
    publisher: &str,
    test_name: &str,
    response: Result<reqwest::Response, reqwest::Error>,
) -> Attempt<(), PublishFailure> {
    let failure = |context: String| PublishFailure::new(publisher, format!("'{test_name}': {context}"));
    match response {
        Ok(response) if response.status().is_success() => Attempt::Done(()),
        Ok(response) if is_transient(response.status()) => {
            Attempt::Retry(failure(format!("endpoint answered {}", response.status())))
        },
        Ok(response) => Attempt::Abort(failure(format!("endpoint answered {}", response.status()))),
        Err(e) => Attempt::Retry(failure(e.to_string())),
    }
}

/// One failure naming every payload that could not be delivered
fn combine(publisher: &str, mut failed: Vec<PublishFailure>) -> Result<(), PublishFailure> {
    if failed.len() <= 1 {
        return failed.pop().map_or(Ok(()), Err);
    }
    let contexts: Vec<String> = failed.into_iter().map(|f| f.context).collect();
    Err(PublishFailure::new(
        publisher,
        format!("{} deliveries failed: {}", contexts.len(), contexts.join("; ")),
    ))
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN || status.is_server_error()
}

impl Publisher for WebhookPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn priority_threshold(&self) -> Option<Priority> {
        self.threshold
    }

    fn can_publish(&self, result: &ValidationResult) -> bool {
        let enriched = result.validation().enriched(self, false);
        self.required_enrichment.iter().all(|key| enriched.contains_key(key))
    }

    fn send(&self, result: &ValidationResult) -> Result<(), PublishFailure> {
        self.send_batch(std::slice::from_ref(result))
    }

    fn send_batch(&self, results: &[ValidationResult]) -> Result<(), PublishFailure> {
        let eligible: Vec<&ValidationResult> = results
            .iter()
            .filter(|r| r.is_failure() && self.will_publish(r))
            .collect();
        if eligible.is_empty() {
            return Ok(());
        }
        self.post_all(&eligible)
    }
}
