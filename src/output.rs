//! Output formatting for human and JSON modes
//!
//! This module provides structured output that can be rendered either as
//! human-readable text or machine-parseable JSON.

use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;

use crate::core::models::{Outcome, Priority, ResultRecord, threshold_label};
use crate::core::ports::{Publisher, Validation};
use crate::core::services::DryRunPlan;
use crate::engine::RunSummary;

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Result of a run
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Environment the run targeted
    pub environment: String,
    /// Whether every validation passed
    pub passed: bool,
    /// Number of results
    pub total: usize,
    /// Number of failures
    pub failures: usize,
    /// Seconds spent executing
    pub elapsed_secs: f64,
    /// Every result, in completion order
    pub results: Vec<ResultRecord>,
    /// Publishers that could not deliver
    pub publish_errors: Vec<String>,
}

impl RunReport {
    /// Build a report from a run summary
    #[must_use]
    pub fn from_summary(environment: &str, summary: &RunSummary) -> Self {
        Self {
            environment: environment.to_string(),
            passed: summary.passed(),
            total: summary.results.len(),
            failures: summary.failures(),
            elapsed_secs: summary.elapsed.as_secs_f64(),
            results: summary.results.iter().map(|r| r.to_record()).collect(),
            publish_errors: summary
                .publish_failure
                .iter()
                .flat_map(|f| f.failures.iter().map(ToString::to_string))
                .collect(),
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => render_json(self),
        }
    }

    fn render_human(&self) {
        println!("Ran {} validation(s) in {}\n", self.total, self.environment);

        for record in &self.results {
            let status = match record.outcome {
                Outcome::Success => "PASS".green(),
                Outcome::Failure => "FAIL".red().bold(),
            };
            println!(
                "  {status} {} [{}] ({:.3}s)",
                record.name, record.priority, record.time_secs
            );
            if record.outcome == Outcome::Failure
                && let Some(description) = &record.description
            {
                for line in description.lines() {
                    println!("         {line}");
                }
            }
        }

        println!();
        if self.passed {
            println!("{}", format!("All {} validation(s) passed.", self.total).green());
        } else {
            println!(
                "{}",
                format!("{} of {} validation(s) failed.", self.failures, self.total).red()
            );
        }

        if !self.publish_errors.is_empty() {
            println!("\nPublishing failed:");
            for error in &self.publish_errors {
                println!("  - {error}");
            }
        }
    }
}

/// A validation in a listing or plan
#[derive(Debug, Serialize)]
pub struct ValidationEntry {
    /// Index in the configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Display name
    pub name: String,
    /// Check type
    pub kind: String,
    /// Declared priority
    pub priority: Priority,
    /// Group, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Tier
    pub order: i64,
}

impl ValidationEntry {
    fn from_validation(index: Option<usize>, validation: &Arc<dyn Validation>) -> Self {
        Self {
            index,
            name: validation.name().to_string(),
            kind: validation.kind().to_string(),
            priority: validation.priority(),
            group: validation.group().map(String::from),
            order: validation.order(),
        }
    }
}

/// A publisher in a listing or plan
#[derive(Debug, Serialize)]
pub struct PublisherEntry {
    /// Display name
    pub name: String,
    /// Minimum priority; `None` publishes everything
    pub threshold: Option<Priority>,
    /// Validations it would notify on (dry run only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationEntry>,
}

/// Result of a dry run
#[derive(Debug, Serialize)]
pub struct DryRunReport {
    /// Environment the plan targets
    pub environment: String,
    /// Publishers by descending threshold
    pub publishers: Vec<PublisherEntry>,
    /// Validations no publisher would notify on
    pub unpublished: Vec<String>,
}

impl DryRunReport {
    /// Build a report from a dry-run plan
    #[must_use]
    pub fn from_plan(environment: &str, plan: &DryRunPlan, validations: &[Arc<dyn Validation>]) -> Self {
        Self {
            environment: environment.to_string(),
            publishers: plan
                .by_threshold()
                .into_iter()
                .map(|entry| PublisherEntry {
                    name: entry.publisher.name().to_string(),
                    threshold: entry.publisher.priority_threshold(),
                    validations: entry
                        .validations
                        .iter()
                        .map(|v| ValidationEntry::from_validation(None, v))
                        .collect(),
                })
                .collect(),
            unpublished: plan
                .unpublished(validations)
                .into_iter()
                .map(|v| v.name().to_string())
                .collect(),
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => render_json(self),
        }
    }

    fn render_human(&self) {
        println!("Dry run for {}\n", self.environment);

        if self.publishers.is_empty() {
            println!("No publishers configured.");
        }

        for publisher in &self.publishers {
            println!(
                "{} (threshold: {})",
                publisher.name.bold(),
                threshold_label(publisher.threshold)
            );
            if publisher.validations.is_empty() {
                println!("  (nothing)");
            }
            for validation in &publisher.validations {
                println!("  {} [{}]", validation.name, validation.priority);
            }
            println!();
        }

        if !self.unpublished.is_empty() {
            println!("{}", "Not published anywhere:".yellow());
            for name in &self.unpublished {
                println!("  {name}");
            }
        }
    }
}

/// Result of listing the configuration
#[derive(Debug, Serialize)]
pub struct ListReport {
    /// Configured validations, in index order
    pub validations: Vec<ValidationEntry>,
    /// Configured publishers, in registration order
    pub publishers: Vec<PublisherEntry>,
}

impl ListReport {
    /// Build a listing
    #[must_use]
    pub fn new(validations: &[Arc<dyn Validation>], publishers: &[Arc<dyn Publisher>]) -> Self {
        Self {
            validations: validations
                .iter()
                .enumerate()
                .map(|(i, v)| ValidationEntry::from_validation(Some(i), v))
                .collect(),
            publishers: publishers
                .iter()
                .map(|p| PublisherEntry {
                    name: p.name().to_string(),
                    threshold: p.priority_threshold(),
                    validations: Vec::new(),
                })
                .collect(),
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => render_json(self),
        }
    }

    fn render_human(&self) {
        if self.validations.is_empty() {
            println!("No validations configured.");
        } else {
            println!("Validations:");
            for v in &self.validations {
                let group = v.group.as_deref().map(|g| format!(" group={g}")).unwrap_or_default();
                println!(
                    "  #{} {} ({}) [{}] order={}{group}",
                    v.index.unwrap_or_default(),
                    v.name,
                    v.kind,
                    v.priority,
                    v.order
                );
            }
        }

        println!();
        if self.publishers.is_empty() {
            println!("No publishers configured.");
        } else {
            println!("Publishers:");
            for p in &self.publishers {
                println!("  {} (threshold: {})", p.name, threshold_label(p.threshold));
            }
        }
    }
}

/// Generic operation result for simple commands
#[derive(Debug, Serialize)]
pub struct OperationResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    pub message: String,
}

impl OperationResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                if self.success {
                    println!("{}", self.message);
                } else {
                    eprintln!("{}", self.message.red());
                }
            },
            OutputMode::Json => render_json(self),
        }
    }
}

fn render_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("could not serialize output: {e}"),
    }
}
