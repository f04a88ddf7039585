//! Runner tests
//!
//! Tiers, group failure snapshots, timing, timeouts and reporting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use test_case::test_case;
use vigil::core::models::{Outcome, Priority, ValidationResult};
use vigil::core::ports::{Publisher, Validation};
use vigil::core::services::GroupValidation;
use vigil::engine::{RunOptions, Runner, run_tests, run_tests_with};
use vigil::error::RunError;

use crate::common::mocks::{Behavior, CountingLauncher, Gauge, MockPublisher, MockValidation};

fn options(processes: usize) -> RunOptions {
    RunOptions {
        processes,
        ..RunOptions::default()
    }
}

fn run(validations: Vec<Arc<dyn Validation>>, options: RunOptions) -> Vec<ValidationResult> {
    Runner::new(options).run(validations, Vec::new()).unwrap().results
}

fn find<'a>(results: &'a [ValidationResult], name: &str) -> &'a ValidationResult {
    results.iter().find(|r| r.test_name() == name).unwrap()
}

// =============================================================================
// Basic outcomes
// =============================================================================

#[test]
fn test_success() {
    let results = run(vec![MockValidation::succeeding("ok").arc()], options(1));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome(), Outcome::Success);
    assert_eq!(results[0].test_name(), "ok");
}

#[test]
fn test_failure_carries_reason() {
    let results = run(vec![MockValidation::failing("bad", "disk full").arc()], options(1));

    assert!(results[0].is_failure());
    assert_eq!(results[0].description(), Some("disk full"));
}

#[test]
fn test_unexpected_error_is_a_failure() {
    let results = run(
        vec![MockValidation::new("err", Behavior::Error("connection reset".into())).arc()],
        options(1),
    );

    assert!(results[0].is_failure());
    assert_eq!(results[0].description(), Some("connection reset"));
}

#[test]
fn test_panic_is_a_failure() {
    let results = run(vec![MockValidation::new("boom", Behavior::Panic).arc()], options(1));

    assert!(results[0].is_failure());
    assert!(results[0].description().unwrap().contains("mock validation exploded"));
}

#[test]
fn test_empty_run_is_rejected() {
    let err = Runner::default().run(Vec::new(), Vec::new()).unwrap_err();
    assert!(matches!(err, RunError::NoValidations));
}

#[test_case(1 ; "sequential")]
#[test_case(4 ; "parallel")]
fn test_batch_produces_one_result_each(processes: usize) {
    let validations: Vec<Arc<dyn Validation>> = (0..6)
        .map(|i| {
            if i % 2 == 0 {
                MockValidation::succeeding(&format!("v{i}")).arc()
            } else {
                MockValidation::failing(&format!("v{i}"), "nope").arc()
            }
        })
        .collect();

    let results = run(validations, options(processes));

    assert_eq!(results.len(), 6);
    assert_eq!(results.iter().filter(|r| r.is_failure()).count(), 3);
}

#[test]
fn test_each_validation_performed_once() {
    let check = Arc::new(MockValidation::succeeding("once"));
    let validations: Vec<Arc<dyn Validation>> = vec![check.clone()];
    run(validations, options(4));
    assert_eq!(check.call_count(), 1);
}

// =============================================================================
// Tiers and group failures
// =============================================================================

#[test]
fn test_same_tier_does_not_see_group_failures() {
    let failing = MockValidation::failing("web-1", "down").with_group("web").arc();
    let sibling = Arc::new(MockValidation::succeeding("sibling"));
    let later = Arc::new(MockValidation::succeeding("later").with_order(1));

    let validations: Vec<Arc<dyn Validation>> = vec![failing, sibling.clone(), later.clone()];
    run(validations, options(1));

    let sibling_seen = sibling.seen.lock().unwrap();
    assert_eq!(sibling_seen[0].count("web"), 0);
    let later_seen = later.seen.lock().unwrap();
    assert_eq!(later_seen[0].get("web"), ["down".to_string()]);
}

#[test]
fn test_tiers_run_in_ascending_order() {
    let validations: Vec<Arc<dyn Validation>> = vec![
        MockValidation::succeeding("third").with_order(5).arc(),
        MockValidation::succeeding("first").with_order(-1).arc(),
        MockValidation::succeeding("second").arc(),
    ];

    let names: Vec<String> = run(validations, options(1))
        .iter()
        .map(|r| r.test_name().to_string())
        .collect();
    assert_eq!(names, ["first", "second", "third"]);
}

#[test_case(1 ; "sequential")]
#[test_case(4 ; "parallel")]
fn test_group_validation_escalates(processes: usize) {
    let group: Arc<dyn Validation> = Arc::new(
        GroupValidation::new("web cluster", "web").with_thresholds(Some(1), Some(2), Some(5)),
    );
    let validations: Vec<Arc<dyn Validation>> = vec![
        MockValidation::failing("web-1", "down").with_group("web").arc(),
        MockValidation::failing("web-2", "down").with_group("web").arc(),
        MockValidation::succeeding("web-3").with_group("web").arc(),
        group,
    ];

    let results = run(validations, options(processes));

    assert_eq!(results.len(), 4);
    assert_eq!(results.iter().filter(|r| r.is_failure()).count(), 3);
    let group_result = find(&results, "web cluster");
    assert!(group_result.is_failure());
    assert_eq!(group_result.priority(), Priority::Normal);
    assert!(group_result.description().unwrap().contains("Group web had 2 failures!"));
}

#[test]
fn test_group_validation_fails_at_low_threshold() {
    let group: Arc<dyn Validation> =
        Arc::new(GroupValidation::new("g", "a").with_low_threshold(2).with_order(1));
    let validations: Vec<Arc<dyn Validation>> = vec![
        MockValidation::succeeding("a-ok").with_group("a").arc(),
        MockValidation::failing("a-1", "down").with_group("a").arc(),
        MockValidation::failing("a-2", "down").with_group("a").arc(),
        group,
    ];

    let results = run(validations, options(1));

    assert_eq!(results.len(), 4);
    assert_eq!(results.iter().filter(|r| r.is_failure()).count(), 3);
    assert!(find(&results, "g").is_failure());
}

#[test]
fn test_ungrouped_failures_stay_out_of_the_ledger() {
    let later = Arc::new(MockValidation::succeeding("later").with_order(1));
    let validations: Vec<Arc<dyn Validation>> = vec![
        MockValidation::failing("loner", "down").arc(),
        MockValidation::succeeding("web-1").with_group("web").arc(),
        later.clone(),
    ];

    run(validations, options(1));

    let seen = later.seen.lock().unwrap();
    assert_eq!(seen[0].iter().count(), 1);
    assert!(seen[0].iter().all(|(_, failures)| failures.is_empty()));
}

// =============================================================================
// Timing and timeouts
// =============================================================================

#[test]
fn test_time_is_measured() {
    let results = run(
        vec![MockValidation::sleeping("slow", Duration::from_millis(50)).arc()],
        options(1),
    );
    assert!(results[0].time() >= Duration::from_millis(50));
}

#[test]
fn test_precise_elapsed_time_overrides_wall_clock() {
    let results = run(
        vec![MockValidation::succeeding("precise").with_elapsed(Duration::from_secs(5)).arc()],
        options(1),
    );
    assert_eq!(results[0].time(), Duration::from_secs(5));
}

#[test_case(1 ; "sequential")]
#[test_case(4 ; "parallel")]
fn test_timeout_records_failure(processes: usize) {
    let timeout = Duration::from_millis(200);
    let options = RunOptions {
        processes,
        timeout: Some(timeout),
        ..RunOptions::default()
    };

    let results = run(
        vec![MockValidation::sleeping("hung", Duration::from_millis(600)).arc()],
        options,
    );

    assert_eq!(results.len(), 1);
    assert!(results[0].is_failure());
    assert_eq!(results[0].time(), timeout);
    assert!(results[0].description().unwrap().contains("timed out"));
}

#[test]
fn test_timeout_retries_total_attempts() {
    let check = Arc::new(MockValidation::sleeping("flaky", Duration::from_millis(300)));
    let options = RunOptions {
        processes: 2,
        timeout: Some(Duration::from_millis(100)),
        timeout_attempts: 3,
        dry_run: false,
    };

    let validations: Vec<Arc<dyn Validation>> = vec![check.clone()];
    let results = run(validations, options);

    assert_eq!(results.len(), 1);
    assert!(results[0].is_failure());
    assert_eq!(check.call_count(), 3);
}

#[test_case(1 ; "sequential")]
#[test_case(2 ; "parallel")]
fn test_retry_after_timeout_can_succeed(processes: usize) {
    let timeout = Duration::from_millis(100);
    let check = Arc::new(MockValidation::new(
        "flaky",
        Behavior::SlowFirst(Duration::from_millis(300)),
    ));
    let options = RunOptions {
        processes,
        timeout: Some(timeout),
        timeout_attempts: 2,
        dry_run: false,
    };

    let validations: Vec<Arc<dyn Validation>> = vec![check.clone()];
    let results = run(validations, options);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome(), Outcome::Success);
    assert!(results[0].time() < timeout);
    assert_eq!(check.call_count(), 2);
}

#[test_case(1 ; "sequential")]
#[test_case(2 ; "parallel")]
fn test_timed_out_attempt_finishes_before_anything_else_starts(processes: usize) {
    let gauge = Arc::new(Gauge::default());
    let slow = Arc::new(MockValidation::sleeping("slow", Duration::from_millis(300)).with_gauge(&gauge));
    let later = Arc::new(MockValidation::succeeding("later").with_order(1).with_gauge(&gauge));
    let options = RunOptions {
        processes,
        timeout: Some(Duration::from_millis(100)),
        timeout_attempts: 2,
        dry_run: false,
    };

    let validations: Vec<Arc<dyn Validation>> = vec![slow.clone(), later.clone()];
    let results = run(validations, options);

    assert_eq!(results.len(), 2);
    assert!(find(&results, "slow").is_failure());
    assert_eq!(find(&results, "slow").time(), Duration::from_millis(100));
    assert_eq!(find(&results, "later").outcome(), Outcome::Success);
    assert_eq!(slow.call_count(), 2);
    assert_eq!(gauge.peak(), 1);
}

#[test]
fn test_sequential_run_with_timeout_performs_one_at_a_time() {
    let gauge = Arc::new(Gauge::default());
    let validations: Vec<Arc<dyn Validation>> = (0..3)
        .map(|i| {
            MockValidation::sleeping(&format!("s{i}"), Duration::from_millis(150))
                .with_gauge(&gauge)
                .arc()
        })
        .collect();
    let options = RunOptions {
        processes: 1,
        timeout: Some(Duration::from_millis(50)),
        timeout_attempts: 3,
        dry_run: false,
    };

    let results = run(validations, options);

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(ValidationResult::is_failure));
    assert_eq!(gauge.peak(), 1);
}

#[test]
fn test_supplied_launcher_starts_timed_attempts() {
    let launcher = Arc::new(CountingLauncher::default());
    let options = RunOptions {
        processes: 1,
        timeout: Some(Duration::from_secs(5)),
        ..RunOptions::default()
    };

    let summary = run_tests_with(
        vec![MockValidation::succeeding("a").arc(), MockValidation::succeeding("b").arc()],
        Vec::new(),
        options,
        launcher.clone(),
    )
    .unwrap();

    assert!(summary.passed());
    assert_eq!(launcher.launched(), 2);
}

#[test]
fn test_untimed_sequential_run_performs_inline() {
    let launcher = Arc::new(CountingLauncher::default());

    run_tests_with(
        vec![MockValidation::succeeding("a").arc()],
        Vec::new(),
        RunOptions::default(),
        launcher.clone(),
    )
    .unwrap();

    assert_eq!(launcher.launched(), 0);
}

#[test]
fn test_fast_validation_is_unaffected_by_timeout() {
    let options = RunOptions {
        processes: 1,
        timeout: Some(Duration::from_secs(5)),
        ..RunOptions::default()
    };
    let results = run(vec![MockValidation::succeeding("quick").arc()], options);
    assert_eq!(results[0].outcome(), Outcome::Success);
}

#[test]
fn test_parallel_runs_concurrently() {
    let validations: Vec<Arc<dyn Validation>> = (0..4)
        .map(|i| MockValidation::sleeping(&format!("s{i}"), Duration::from_millis(300)).arc())
        .collect();

    let start = Instant::now();
    let results = run(validations, options(4));

    assert_eq!(results.len(), 4);
    assert!(start.elapsed() < Duration::from_millis(1000));
}

// =============================================================================
// Reporting and dry runs
// =============================================================================

#[test]
fn test_results_reach_publishers() {
    let publisher = Arc::new(MockPublisher::new("chat", None));
    let publishers: Vec<Arc<dyn Publisher>> = vec![publisher.clone()];

    Runner::default()
        .run(vec![MockValidation::failing("bad", "x").arc()], publishers)
        .unwrap();

    assert_eq!(publisher.batch_count(), 1);
    assert_eq!(publisher.published(), ["bad"]);
}

#[test]
fn test_publish_failure_does_not_stop_other_publishers() {
    let healthy = Arc::new(MockPublisher::new("healthy", None));
    let publishers: Vec<Arc<dyn Publisher>> =
        vec![Arc::new(MockPublisher::failing("broken")), healthy.clone()];

    let summary = Runner::default()
        .run(vec![MockValidation::succeeding("ok").arc()], publishers)
        .unwrap();

    assert_eq!(healthy.batch_count(), 1);
    let failure = summary.publish_failure.as_ref().unwrap();
    assert_eq!(failure.failures.len(), 1);
    assert_eq!(failure.failures[0].publisher, "broken");
}

#[test]
fn test_run_tests_raises_reporting_failure() {
    let publishers: Vec<Arc<dyn Publisher>> = vec![Arc::new(MockPublisher::failing("broken"))];

    let err = run_tests(
        vec![MockValidation::succeeding("ok").arc()],
        publishers,
        RunOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, RunError::Reporting(_)));
}

#[test]
fn test_dry_run_performs_nothing() {
    let check = Arc::new(MockValidation::succeeding("untouched"));
    let publisher = Arc::new(MockPublisher::new("chat", None));
    let publishers: Vec<Arc<dyn Publisher>> = vec![publisher.clone()];

    let validations: Vec<Arc<dyn Validation>> = vec![check.clone()];

    let summary = Runner::new(RunOptions {
        dry_run: true,
        ..RunOptions::default()
    })
    .run(validations, publishers)
    .unwrap();

    assert!(!summary.executed);
    assert!(summary.results.is_empty());
    assert_eq!(summary.plan.validations_for(0).len(), 1);
    assert_eq!(check.call_count(), 0);
    assert_eq!(publisher.batch_count(), 0);
}
