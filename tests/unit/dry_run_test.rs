//! Dry-run plan tests

use std::sync::Arc;

use vigil::core::models::Priority;
use vigil::core::ports::{Publisher, Validation};
use vigil::core::services::compute_dry_run;

use crate::common::mocks::{EnrichedPublisher, MockPublisher, MockValidation};

fn validations() -> Vec<Arc<dyn Validation>> {
    vec![
        MockValidation::succeeding("low").with_priority(Priority::Low).arc(),
        MockValidation::succeeding("normal").with_priority(Priority::Normal).arc(),
        MockValidation::succeeding("critical").with_priority(Priority::Critical).arc(),
    ]
}

fn names(validations: &[Arc<dyn Validation>]) -> Vec<&str> {
    validations.iter().map(|v| v.name()).collect()
}

#[test]
fn test_threshold_filters_validations() {
    let validations = validations();
    let publishers: Vec<Arc<dyn Publisher>> = vec![
        Arc::new(MockPublisher::new("log", Some(Priority::Low))),
        Arc::new(MockPublisher::new("chat", Some(Priority::Normal))),
        Arc::new(MockPublisher::new("pager", Some(Priority::Critical))),
    ];

    let plan = compute_dry_run(&validations, &publishers);

    assert_eq!(plan.validations_for(0).len(), 3);
    assert_eq!(plan.validations_for(1).len(), 2);
    assert_eq!(plan.validations_for(2).len(), 1);
}

#[test]
fn test_validations_sorted_by_descending_priority() {
    let validations = validations();
    let publishers: Vec<Arc<dyn Publisher>> = vec![Arc::new(MockPublisher::new("all", None))];

    let plan = compute_dry_run(&validations, &publishers);

    assert_eq!(names(plan.validations_for(0)), ["critical", "normal", "low"]);
}

#[test]
fn test_by_threshold_puts_highest_first() {
    let validations = validations();
    let publishers: Vec<Arc<dyn Publisher>> = vec![
        Arc::new(MockPublisher::new("any", None)),
        Arc::new(MockPublisher::new("chat", Some(Priority::Normal))),
        Arc::new(MockPublisher::new("pager", Some(Priority::Critical))),
    ];

    let plan = compute_dry_run(&validations, &publishers);
    let order: Vec<&str> = plan.by_threshold().into_iter().map(|e| e.publisher.name()).collect();

    assert_eq!(order, ["pager", "chat", "any"]);
}

#[test]
fn test_missing_enrichment_surfaces_as_unpublished() {
    let validations = validations();
    let publishers: Vec<Arc<dyn Publisher>> = vec![Arc::new(EnrichedPublisher { required: "key" })];

    let plan = compute_dry_run(&validations, &publishers);

    assert!(plan.validations_for(0).is_empty());
    assert_eq!(plan.unpublished(&validations).len(), 3);
}
