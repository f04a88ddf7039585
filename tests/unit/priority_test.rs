//! Property-based tests for priorities and thresholds
//!
//! Uses proptest to verify properties that should hold for all inputs.

use proptest::prelude::*;
use test_case::test_case;
use vigil::core::models::Priority;
use vigil::core::services::GroupValidation;

fn priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

proptest! {
    /// A missing threshold publishes every priority
    #[test]
    fn missing_threshold_publishes_everything(p in priority()) {
        prop_assert!(p.meets(None));
    }

    /// Raising a result's priority never stops it from being published
    #[test]
    fn meets_is_monotonic_in_priority(a in priority(), b in priority(), t in priority()) {
        prop_assume!(a <= b);
        if a.meets(Some(t)) {
            prop_assert!(b.meets(Some(t)));
        }
    }

    /// Raising the threshold never publishes more
    #[test]
    fn meets_is_antitone_in_threshold(p in priority(), lo in priority(), hi in priority()) {
        prop_assume!(lo <= hi);
        if p.meets(Some(hi)) {
            prop_assert!(p.meets(Some(lo)));
        }
    }

    /// Display and FromStr agree
    #[test]
    fn display_parses_back(p in priority()) {
        prop_assert_eq!(p.to_string().parse::<Priority>().unwrap(), p);
    }
}

fn threshold() -> impl Strategy<Value = Option<usize>> {
    prop::option::of(0usize..20)
}

proptest! {
    /// Group thresholds are ascending whatever they were configured as
    #[test]
    fn group_thresholds_are_ascending(low in threshold(), normal in threshold(), critical in threshold()) {
        let group = GroupValidation::new("cluster", "web").with_thresholds(low, normal, critical);
        let (low, normal, critical) = group.thresholds();

        if let (Some(low), Some(normal)) = (low, normal) {
            prop_assert!(low <= normal);
        }
        if let (Some(normal), Some(critical)) = (normal, critical) {
            prop_assert!(normal <= critical);
        }
        if let (Some(low), Some(critical)) = (low, critical) {
            prop_assert!(low <= critical);
        }
    }

    /// More failures never lower a group's priority
    #[test]
    fn group_priority_grows_with_failures(
        low in threshold(),
        normal in threshold(),
        critical in threshold(),
        failures in 0usize..30,
    ) {
        let group = GroupValidation::new("cluster", "web").with_thresholds(low, normal, critical);
        prop_assert!(group.priority_for(failures) <= group.priority_for(failures + 1));
    }
}

#[test_case("low", Priority::Low ; "low")]
#[test_case("NORMAL", Priority::Normal ; "case insensitive")]
#[test_case("critical", Priority::Critical ; "critical")]
fn test_parse(input: &str, expected: Priority) {
    assert_eq!(input.parse::<Priority>().unwrap(), expected);
}

#[test]
fn test_parse_rejects_unknown() {
    let err = "urgent".parse::<Priority>().unwrap_err();
    assert!(err.contains("Invalid priority"));
}

#[test]
fn test_serde_lowercase() {
    assert_eq!(serde_json::to_string(&Priority::Critical).unwrap(), "\"critical\"");
    let parsed: Priority = serde_json::from_str("\"low\"").unwrap();
    assert_eq!(parsed, Priority::Low);
}
