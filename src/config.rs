//! Run configuration
//!
//! A run is described by one TOML file: run options, named environments,
//! the validations to perform and the publishers to notify. Looked up at
//! `./vigil.toml`, then `~/.config/vigil/config.toml` (XDG standard).
//!
//! The order of `[[validations]]` in the file is the canonical validation
//! index; worker processes rebuild the same list and address checks by it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::adapters::checks::{CommandCheck, TcpCheck};
use crate::adapters::publishers::{ConsolePublisher, JsonPublisher, JunitPublisher};
use crate::core::models::{EnrichmentValues, Priority};
use crate::core::ports::{Publisher, Validation, ValidationInfo};
use crate::core::services::{GroupValidation, RetryPolicy};
use crate::engine::RunOptions;
use crate::error::ConfigError;

/// File name looked up in the current directory
pub const CONFIG_FILE: &str = "vigil.toml";

/// Environment name used when none is selected
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// A complete run configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Run options
    #[serde(default)]
    pub run: RunConfig,
    /// Named environments
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
    /// Validations, in index order
    #[serde(default)]
    pub validations: Vec<ValidationConfig>,
    /// Publishers, in registration order
    #[serde(default)]
    pub publishers: Vec<PublisherConfig>,
}

/// The `[run]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Attempts in flight at once
    #[serde(default = "default_processes")]
    pub processes: usize,
    /// Per-attempt timeout in seconds
    #[serde(default)]
    pub timeout: Option<f64>,
    /// Total attempts per timing-out validation
    #[serde(default = "default_timeout_attempts")]
    pub timeout_attempts: u32,
    /// JUnit report written after every run
    #[serde(default)]
    pub results_file: Option<PathBuf>,
    /// Selected environment
    #[serde(default)]
    pub environment: Option<String>,
}

const fn default_processes() -> usize {
    1
}

const fn default_timeout_attempts() -> u32 {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            processes: default_processes(),
            timeout: None,
            timeout_attempts: default_timeout_attempts(),
            results_file: None,
            environment: None,
        }
    }
}

/// An `[environments.<name>]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Host aliases
    #[serde(default)]
    pub hosts: BTreeMap<String, String>,
}

/// One `[[validations]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Display name
    pub name: String,
    /// Declared priority (checks default to normal, groups to low)
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Group this validation reports failures to
    #[serde(default)]
    pub group: Option<String>,
    /// Tier (checks default to 0, groups to 1)
    #[serde(default)]
    pub order: Option<i64>,
    /// Check-level timeout in seconds
    #[serde(default)]
    pub timeout: Option<f64>,
    /// Publisher-specific data
    #[serde(default)]
    pub enrichment: Vec<EnrichmentConfig>,
    /// What to check
    #[serde(flatten)]
    pub check: CheckConfig,
}

/// Type-specific validation fields
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CheckConfig {
    /// Run a program
    Command {
        /// Program and arguments
        command: Vec<String>,
        /// Expected exit code
        #[serde(default)]
        expect_exit: i32,
        /// Required stdout substring
        #[serde(default)]
        stdout_contains: Option<String>,
        /// Required stdout pattern
        #[serde(default)]
        stdout_matches: Option<String>,
    },
    /// Connect to a TCP endpoint
    Tcp {
        /// Host or environment alias
        host: String,
        /// Port
        port: u16,
        /// Metric timer for connect latency
        #[serde(default)]
        timer_name: Option<String>,
    },
    /// Judge the failures of a group
    Group {
        /// Group being judged
        checked_group: String,
        /// Failures needed to fail at all
        #[serde(default)]
        low_threshold: Option<usize>,
        /// Failures needed to escalate to normal
        #[serde(default)]
        normal_threshold: Option<usize>,
        /// Failures needed to escalate to critical
        #[serde(default)]
        critical_threshold: Option<usize>,
    },
}

/// One `[[validations.enrichment]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrichmentConfig {
    /// Namespace of the publisher type the data is for
    pub publisher: String,
    /// Keep every key private to that publisher
    #[serde(default)]
    pub force_namespace: bool,
    /// The data
    #[serde(default)]
    pub values: EnrichmentValues,
}

/// One `[[publishers]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct PublisherConfig {
    /// Minimum priority; absent publishes everything
    #[serde(default)]
    pub threshold: Option<Priority>,
    /// Where to publish
    #[serde(flatten)]
    pub target: PublisherTarget,
}

/// Type-specific publisher fields
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PublisherTarget {
    /// Collapsed summary on stderr
    Console,
    /// JUnit XML file
    Junit {
        /// Output file
        path: PathBuf,
    },
    /// JSON file
    Json {
        /// Output file
        path: PathBuf,
    },
    /// HTTP endpoint
    Webhook {
        /// Endpoint URL
        url: String,
        /// Enrichment keys each validation must carry
        #[serde(default)]
        required_enrichment: Vec<String>,
        /// Total delivery attempts
        #[serde(default = "default_webhook_attempts")]
        attempts: u32,
        /// First backoff delay in seconds
        #[serde(default = "default_backoff_base")]
        backoff_base: f64,
    },
}

const fn default_webhook_attempts() -> u32 {
    4
}

const fn default_backoff_base() -> f64 {
    1.0
}

/// Command-line overrides of the `[run]` table
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// Attempts in flight at once
    pub processes: Option<usize>,
    /// Per-attempt timeout in seconds
    pub timeout: Option<f64>,
    /// Total attempts per timing-out validation
    pub timeout_attempts: Option<u32>,
    /// Selected environment
    pub environment: Option<String>,
}

impl Config {
    /// Candidate locations, in lookup order
    #[must_use]
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("vigil").join("config.toml"));
        }
        paths
    }

    /// Load `explicit`, or the first existing candidate location
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, path.to_path_buf()));
        }
        let candidates = Self::search_paths();
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Ok((Self::load(path)?, path.clone())),
            None => Err(ConfigError::NotFound(candidates)),
        }
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::parse(&content)
    }

    /// Parse configuration text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, overrides: &RunOverrides) {
        if let Some(processes) = overrides.processes {
            self.run.processes = processes;
        }
        if let Some(timeout) = overrides.timeout {
            self.run.timeout = Some(timeout);
        }
        if let Some(attempts) = overrides.timeout_attempts {
            self.run.timeout_attempts = attempts;
        }
        if let Some(environment) = &overrides.environment {
            self.run.environment = Some(environment.clone());
        }
    }

    /// Name of the selected environment
    #[must_use]
    pub fn environment_name(&self) -> &str {
        self.run.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    }

    /// The selected environment, if one is selected
    pub fn environment(&self) -> Result<Option<&EnvironmentConfig>, ConfigError> {
        match &self.run.environment {
            None => Ok(None),
            Some(name) => self
                .environments
                .get(name)
                .map(Some)
                .ok_or_else(|| ConfigError::UnknownEnvironment(name.clone())),
        }
    }

    /// Resolve a host alias of the selected environment
    ///
    /// Unknown aliases are returned unchanged.
    pub fn hostname(&self, alias: &str) -> Result<String, ConfigError> {
        let resolved = self
            .environment()?
            .and_then(|env| env.hosts.get(alias))
            .map_or_else(|| alias.to_string(), Clone::clone);
        Ok(resolved)
    }

    /// Engine options from the `[run]` table
    pub fn run_options(&self, dry_run: bool) -> Result<RunOptions, ConfigError> {
        if self.run.processes == 0 {
            return Err(ConfigError::invalid("run.processes", "must be at least 1"));
        }
        if self.run.timeout_attempts == 0 {
            return Err(ConfigError::invalid("run.timeout_attempts", "must be at least 1"));
        }
        let timeout = self
            .run
            .timeout
            .map(|secs| seconds("run.timeout", secs))
            .transpose()?;
        Ok(RunOptions {
            processes: self.run.processes,
            timeout,
            timeout_attempts: self.run.timeout_attempts,
            dry_run,
        })
    }

    /// Build every configured validation, in index order
    pub fn build_validations(&self) -> Result<Vec<Arc<dyn Validation>>, ConfigError> {
        self.environment()?;
        self.validations
            .iter()
            .enumerate()
            .map(|(index, entry)| self.build_validation(index, entry))
            .collect()
    }

    fn build_validation(&self, index: usize, entry: &ValidationConfig) -> Result<Arc<dyn Validation>, ConfigError> {
        let field = |name: &str| format!("validations[{index}].{name}");

        let timeout = entry
            .timeout
            .map(|secs| seconds(&field("timeout"), secs))
            .transpose()?;
        let mut info = ValidationInfo::new(&entry.name);
        if let Some(timeout) = timeout {
            info = info.with_timeout(timeout);
        }

        let mut validation: Box<dyn Validation> = match &entry.check {
            CheckConfig::Command {
                command,
                expect_exit,
                stdout_contains,
                stdout_matches,
            } => {
                let Some((program, args)) = command.split_first() else {
                    return Err(ConfigError::invalid(field("command"), "must name a program"));
                };
                let mut check = CommandCheck::new(info, program, args.to_vec()).with_expect_exit(*expect_exit);
                if let Some(needle) = stdout_contains {
                    check = check.with_stdout_contains(needle);
                }
                if let Some(pattern) = stdout_matches {
                    let regex =
                        Regex::new(pattern).map_err(|e| ConfigError::invalid(field("stdout_matches"), e.to_string()))?;
                    check = check.with_stdout_matches(regex);
                }
                Box::new(check)
            },
            CheckConfig::Tcp { host, port, timer_name } => {
                let mut check = TcpCheck::new(info, self.hostname(host)?, *port);
                if let Some(timer) = timer_name {
                    check = check.with_timer_name(timer);
                }
                Box::new(check)
            },
            CheckConfig::Group {
                checked_group,
                low_threshold,
                normal_threshold,
                critical_threshold,
            } => Box::new(GroupValidation::new(&entry.name, checked_group).with_thresholds(
                *low_threshold,
                *normal_threshold,
                *critical_threshold,
            )),
        };

        let defaults = validation.info_mut();
        if let Some(priority) = entry.priority {
            defaults.priority = priority;
        }
        if let Some(order) = entry.order {
            defaults.order = order;
        }
        if entry.group.is_some() {
            defaults.group.clone_from(&entry.group);
        }
        if timeout.is_some() {
            defaults.timeout = timeout;
        }

        for enrichment in &entry.enrichment {
            validation.info_mut().enrich(
                &enrichment.publisher,
                enrichment.values.clone(),
                enrichment.force_namespace,
            )?;
        }

        Ok(Arc::from(validation))
    }

    /// Build every configured publisher, plus the `results_file` report
    pub fn build_publishers(&self) -> Result<Vec<Arc<dyn Publisher>>, ConfigError> {
        let mut publishers = self
            .publishers
            .iter()
            .enumerate()
            .map(|(index, entry)| self.build_publisher(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(path) = &self.run.results_file {
            publishers.push(Arc::new(JunitPublisher::new(path)));
        }
        Ok(publishers)
    }

    fn build_publisher(&self, index: usize, entry: &PublisherConfig) -> Result<Arc<dyn Publisher>, ConfigError> {
        let threshold = entry.threshold;
        Ok(match &entry.target {
            PublisherTarget::Console => Arc::new(ConsolePublisher::new(self.environment_name(), threshold)),
            PublisherTarget::Junit { path } => Arc::new(JunitPublisher::new(path).with_threshold(threshold)),
            PublisherTarget::Json { path } => Arc::new(JsonPublisher::new(path, threshold)),
            PublisherTarget::Webhook {
                url,
                required_enrichment,
                attempts,
                backoff_base,
            } => {
                let retry = RetryPolicy::new(
                    *attempts,
                    seconds(&format!("publishers[{index}].backoff_base"), *backoff_base)?,
                );
                self.build_webhook(index, url, required_enrichment, retry, threshold)?
            },
        })
    }

    #[cfg(feature = "webhook")]
    fn build_webhook(
        &self,
        _index: usize,
        url: &str,
        required_enrichment: &[String],
        retry: RetryPolicy,
        threshold: Option<Priority>,
    ) -> Result<Arc<dyn Publisher>, ConfigError> {
        use crate::adapters::publishers::WebhookPublisher;

        Ok(Arc::new(
            WebhookPublisher::new(url, self.environment_name(), threshold)
                .with_required_enrichment(required_enrichment.to_vec())
                .with_retry(retry),
        ))
    }

    #[cfg(not(feature = "webhook"))]
    fn build_webhook(
        &self,
        index: usize,
        _url: &str,
        _required_enrichment: &[String],
        _retry: RetryPolicy,
        _threshold: Option<Priority>,
    ) -> Result<Arc<dyn Publisher>, ConfigError> {
        Err(ConfigError::invalid(
            format!("publishers[{index}].type"),
            "webhook publishers need vigil built with the `webhook` feature",
        ))
    }
}

fn seconds(field: &str, secs: f64) -> Result<Duration, ConfigError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(ConfigError::invalid(field, format!("expected a positive number of seconds, got {secs}"))),
    }
}
