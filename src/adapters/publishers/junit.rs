//! JUnit XML publisher
//!
//! Writes every result of a run as one `testsuite`, so CI systems can
//! display validation runs like test runs.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::models::{Priority, ValidationResult};
use crate::core::ports::Publisher;
use crate::error::PublishFailure;

/// Test suite name written into the report
pub const SUITE_NAME: &str = "vigil";

/// Writes a JUnit XML report file
#[derive(Debug, Clone)]
pub struct JunitPublisher {
    name: String,
    path: PathBuf,
    threshold: Option<Priority>,
}

impl JunitPublisher {
    /// Create a publisher writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            name: "junit".to_string(),
            path: path.into(),
            threshold: None,
        }
    }

    /// Only report results at or above `threshold`
    #[must_use]
    pub const fn with_threshold(mut self, threshold: Option<Priority>) -> Self {
        self.threshold = threshold;
        self
    }

    /// Report file location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the XML document for `results`
    #[must_use]
    pub fn render(&self, results: &[ValidationResult]) -> String {
        let eligible: Vec<&ValidationResult> = results.iter().filter(|r| self.will_publish(r)).collect();
        let failures = eligible.iter().filter(|r| r.is_failure()).count();
        let total: Duration = eligible.iter().map(|r| r.time()).sum();

        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            xml,
            "<testsuite errors=\"0\" failures=\"{failures}\" name=\"{SUITE_NAME}\" skips=\"0\" tests=\"{}\" \
             time=\"{:.3}\" timestamp=\"{}\">",
            eligible.len(),
            total.as_secs_f64(),
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S")
        );

        for result in eligible {
            let _ = write!(
                xml,
                "  <testcase classname=\"{}\" name=\"{}\" time=\"{:.3}\"",
                escape_xml(result.validation().kind()),
                escape_xml(result.test_name()),
                result.time().as_secs_f64()
            );
            if result.is_failure() {
                let _ = writeln!(xml, ">");
                let _ = writeln!(
                    xml,
                    "    <failure message=\"test failure\">{}</failure>",
                    escape_xml(&result.to_string())
                );
                let _ = writeln!(xml, "  </testcase>");
            } else {
                let _ = writeln!(xml, " />");
            }
        }

        xml.push_str("</testsuite>\n");
        xml
    }
}

fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl Publisher for JunitPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        "junit"
    }

    fn priority_threshold(&self) -> Option<Priority> {
        self.threshold
    }

    fn send(&self, result: &ValidationResult) -> Result<(), PublishFailure> {
        Err(PublishFailure::new(
            &self.name,
            format!("cannot publish '{}' alone; JUnit reports cover a whole run", result.test_name()),
        ))
    }

    fn send_batch(&self, results: &[ValidationResult]) -> Result<(), PublishFailure> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| PublishFailure::new(&self.name, format!("{}: {e}", parent.display())))?;
        }
        std::fs::write(&self.path, self.render(results))
            .map_err(|e| PublishFailure::new(&self.name, format!("{}: {e}", self.path.display())))
    }
}
