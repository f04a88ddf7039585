//! Mock implementations of port traits for testing
//!
//! These mocks provide configurable behavior for unit testing without
//! touching real infrastructure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vigil::core::models::{GroupFailures, Priority, ValidationResult};
use vigil::core::ports::{Publisher, Validation, ValidationInfo};
use vigil::engine::{AttemptHandle, Launcher, ThreadLauncher};
use vigil::error::{CheckError, PublishFailure};

/// What a mock validation does when performed
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Pass
    Succeed,
    /// Fail with the given reason
    Fail(String),
    /// Raise an unexpected error
    Error(String),
    /// Panic
    Panic,
    /// Sleep, then pass
    Sleep(Duration),
    /// Sleep on the first attempt only, then pass
    SlowFirst(Duration),
}

/// Counts mock validations performing at the same time
#[derive(Debug, Default)]
pub struct Gauge {
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    /// Most validations ever performing at once
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Entered<'_> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        Entered(self)
    }
}

struct Entered<'a>(&'a Gauge);

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.0.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Validation with scripted behavior
#[derive(Debug)]
pub struct MockValidation {
    info: ValidationInfo,
    behavior: Behavior,
    elapsed: Option<Duration>,
    gauge: Option<Arc<Gauge>>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<GroupFailures>>,
}

impl MockValidation {
    pub fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            info: ValidationInfo::new(name),
            behavior,
            elapsed: None,
            gauge: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(name: &str) -> Self {
        Self::new(name, Behavior::Succeed)
    }

    pub fn failing(name: &str, reason: &str) -> Self {
        Self::new(name, Behavior::Fail(reason.to_string()))
    }

    pub fn sleeping(name: &str, duration: Duration) -> Self {
        Self::new(name, Behavior::Sleep(duration))
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.info.priority = priority;
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.info.group = Some(group.to_string());
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.info.order = order;
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    pub fn with_gauge(mut self, gauge: &Arc<Gauge>) -> Self {
        self.gauge = Some(Arc::clone(gauge));
        self
    }

    pub fn arc(self) -> Arc<dyn Validation> {
        Arc::new(self)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Validation for MockValidation {
    fn info(&self) -> &ValidationInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ValidationInfo {
        &mut self.info
    }

    fn kind(&self) -> &'static str {
        "mock"
    }

    fn elapsed_time(&self) -> Option<Duration> {
        self.elapsed
    }

    fn perform(&self, group_failures: &GroupFailures) -> Result<(), CheckError> {
        let _entered = self.gauge.as_deref().map(Gauge::enter);
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(group_failures.clone());
        match &self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(reason) => Err(CheckError::fail(reason.clone())),
            Behavior::Error(message) => Err(CheckError::unexpected(message)),
            Behavior::Panic => panic!("mock validation exploded"),
            Behavior::Sleep(duration) => {
                std::thread::sleep(*duration);
                Ok(())
            },
            Behavior::SlowFirst(duration) => {
                if call == 0 {
                    std::thread::sleep(*duration);
                }
                Ok(())
            },
        }
    }
}

/// Publisher that records what it was given
#[derive(Debug)]
pub struct MockPublisher {
    name: String,
    threshold: Option<Priority>,
    fail: bool,
    pub batches: AtomicUsize,
    pub published: Mutex<Vec<String>>,
}

impl MockPublisher {
    pub fn new(name: &str, threshold: Option<Priority>) -> Self {
        Self {
            name: name.to_string(),
            threshold,
            fail: false,
            batches: AtomicUsize::new(0),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name, None)
        }
    }

    pub fn batch_count(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

impl Publisher for MockPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        "mock"
    }

    fn priority_threshold(&self) -> Option<Priority> {
        self.threshold
    }

    fn send(&self, result: &ValidationResult) -> Result<(), PublishFailure> {
        if self.will_publish(result) {
            self.published.lock().unwrap().push(result.test_name().to_string());
        }
        Ok(())
    }

    fn send_batch(&self, results: &[ValidationResult]) -> Result<(), PublishFailure> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PublishFailure::new(&self.name, "mock failure"));
        }
        for result in results {
            self.send(result)?;
        }
        Ok(())
    }
}

/// Publisher needing enrichment under its own namespace
#[derive(Debug)]
pub struct EnrichedPublisher {
    pub required: &'static str,
}

impl Publisher for EnrichedPublisher {
    fn name(&self) -> &str {
        "pager"
    }

    fn namespace(&self) -> &str {
        "pager"
    }

    fn priority_threshold(&self) -> Option<Priority> {
        None
    }

    fn can_publish(&self, result: &ValidationResult) -> bool {
        result.validation().enriched(self, false).contains_key(self.required)
    }
}

/// Thread launcher counting the attempts it starts
#[derive(Debug, Default)]
pub struct CountingLauncher {
    pub launched: AtomicUsize,
}

impl CountingLauncher {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }
}

impl Launcher for CountingLauncher {
    fn launch(
        &self,
        index: usize,
        validation: &Arc<dyn Validation>,
        group_failures: &Arc<GroupFailures>,
    ) -> Box<dyn AttemptHandle> {
        self.launched.fetch_add(1, Ordering::SeqCst);
        ThreadLauncher.launch(index, validation, group_failures)
    }
}
