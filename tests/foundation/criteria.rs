//! Integration tests for match criteria

use trellis_foundation::{Criteria, EntityId, Record, Value};

#[test]
fn subset_ignores_extra_fields() {
    let criteria = Criteria::from(Record::new().with("team", "red"));

    assert!(criteria.matches(&Record::new().with("team", "red").with("rank", 3).into()));
    assert!(!criteria.matches(&Record::new().with("team", "blue").into()));
    assert!(!criteria.matches(&Record::new().with("rank", 3).into()));
    assert!(!criteria.matches(&Value::from("red")));
}

#[test]
fn empty_subset_matches_anything() {
    let criteria = Criteria::from(Record::new());
    assert!(criteria.matches(&Value::Int(1)));
    assert!(criteria.matches(&Record::new().with("a", 1).into()));
}

#[test]
fn record_values_become_subset_criteria() {
    let criteria = Criteria::from(Value::from(Record::new().with("a", 1)));
    assert!(matches!(criteria, Criteria::Subset(_)));

    let criteria = Criteria::from(Value::Int(1));
    assert_eq!(criteria, Criteria::Equals(Value::Int(1)));
}

#[test]
fn scalars_require_exact_equality() {
    assert!(Criteria::from(3_i64).matches(&Value::Int(3)));
    assert!(!Criteria::from(3_i64).matches(&Value::Float(3.0)));
    assert!(Criteria::from("guard".to_string()).matches(&Value::from("guard")));
}

#[test]
fn every_scalar_value_conversion_is_a_criteria() {
    assert!(Criteria::from(10).matches(&Value::Int(10)));
    assert!(Criteria::from(10_u32).matches(&Value::Int(10)));
    assert!(Criteria::from(true).matches(&Value::Bool(true)));
    assert!(Criteria::from(1.5).matches(&Value::Float(1.5)));

    let owner = EntityId::from("npc-1");
    assert!(Criteria::from(&owner).matches(&Value::from(&owner)));
    assert!(Criteria::from(owner.clone()).matches(&Value::from(owner)));
}

// =============================================================================
// Properties
// =============================================================================

mod properties {
    use std::collections::BTreeMap;

    use proptest::prelude::*;
    use trellis_foundation::{Criteria, Record, Value};

    fn fields() -> impl Strategy<Value = BTreeMap<String, i64>> {
        prop::collection::btree_map("[a-e]", -3_i64..3, 0..5)
    }

    proptest! {
        #[test]
        fn records_match_any_subset_of_themselves(
            record in fields(),
            keep in prop::collection::vec(any::<bool>(), 5),
        ) {
            let subset: Record = record
                .iter()
                .zip(&keep)
                .filter(|(_, keep)| **keep)
                .map(|((k, v), _)| (k.as_str(), *v))
                .collect();
            let candidate: Record = record.iter().map(|(k, v)| (k.as_str(), *v)).collect();

            prop_assert!(Criteria::from(subset).matches(&Value::from(candidate)));
        }

        #[test]
        fn a_changed_field_breaks_the_match(record in fields()) {
            prop_assume!(!record.is_empty());
            let candidate: Record = record.iter().map(|(k, v)| (k.as_str(), *v)).collect();
            let (field, value) = record.iter().next().unwrap();
            let criteria = Criteria::from(Record::new().with(field.as_str(), value + 10));

            prop_assert!(!criteria.matches(&Value::from(candidate)));
        }
    }
}
