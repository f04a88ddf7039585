//! Reporter tests

use std::sync::Arc;

use vigil::core::models::ValidationResult;
use vigil::core::ports::Publisher;
use vigil::core::services::Reporter;

use crate::common::mocks::{MockPublisher, MockValidation};

fn result(name: &str) -> ValidationResult {
    let validation = MockValidation::succeeding(name).arc();
    ValidationResult::failure(name, &validation, "broken")
}

#[test]
fn test_collect_is_append_only() {
    let mut reporter = Reporter::new(Vec::new());
    reporter.collect(result("a"));
    reporter.collect(result("a"));
    assert_eq!(reporter.results().len(), 2);
}

#[test]
fn test_no_publishers_is_ok() {
    let mut reporter = Reporter::new(Vec::new());
    reporter.collect(result("a"));
    assert!(reporter.report().is_ok());
}

#[test]
fn test_every_publisher_called_despite_failure() {
    let healthy: Vec<Arc<MockPublisher>> = (0..10)
        .map(|i| Arc::new(MockPublisher::new(&format!("p{i}"), None)))
        .collect();
    let mut publishers: Vec<Arc<dyn Publisher>> =
        healthy.iter().map(|p| Arc::clone(p) as Arc<dyn Publisher>).collect();
    publishers.insert(5, Arc::new(MockPublisher::failing("broken")));

    let mut reporter = Reporter::new(publishers);
    reporter.collect(result("a"));
    let err = reporter.report().unwrap_err();

    assert_eq!(err.failures.len(), 1);
    assert_eq!(err.failures[0].publisher, "broken");
    for publisher in &healthy {
        assert_eq!(publisher.batch_count(), 1);
        assert_eq!(publisher.published(), ["a"]);
    }
}

#[test]
fn test_all_failures_aggregated() {
    let publishers: Vec<Arc<dyn Publisher>> = vec![
        Arc::new(MockPublisher::failing("x")),
        Arc::new(MockPublisher::failing("y")),
    ];
    let reporter = Reporter::new(publishers);

    let err = reporter.report().unwrap_err();
    let names: Vec<&str> = err.failures.iter().map(|f| f.publisher.as_str()).collect();
    assert_eq!(names, ["x", "y"]);
    assert!(err.to_string().contains("could not publish to x: mock failure"));
}
