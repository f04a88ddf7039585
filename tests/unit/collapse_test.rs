//! Failure collapsing tests

use vigil::core::models::ValidationResult;
use vigil::core::services::{collapse_failures, collapsed_summary};

use crate::common::mocks::MockValidation;

fn failure(name: &str, description: &str) -> ValidationResult {
    let validation = MockValidation::succeeding(name).arc();
    ValidationResult::failure(name, &validation, description)
}

fn success(name: &str) -> ValidationResult {
    let validation = MockValidation::succeeding(name).arc();
    ValidationResult::success(name, &validation, None)
}

#[test]
fn test_shared_descriptions_collapse() {
    let results = vec![
        failure("a", "host down"),
        success("ok"),
        failure("b", "disk full"),
        failure("c", "host down"),
    ];

    let collapsed = collapse_failures(&results);

    assert_eq!(collapsed.len(), 2);
    assert_eq!(collapsed[0].description, "host down");
    assert_eq!(collapsed[0].names, ["a", "c"]);
    assert_eq!(collapsed[1].names, ["b"]);
}

#[test]
fn test_summary_message() {
    let results = vec![failure("a", "host down"), failure("c", "host down")];
    let summary = collapsed_summary("prod", &collapse_failures(&results)).unwrap();

    assert_eq!(summary, "2 failure(s) in prod:\n(failed) a, c\nDescription: host down");
}

#[test]
fn test_no_failures_no_summary() {
    let results = vec![success("ok")];
    assert!(collapsed_summary("prod", &collapse_failures(&results)).is_none());
}
