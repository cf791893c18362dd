//! Property tests for the aggregation engine.
//!
//! 1. Distinct values are sorted, unique, trimmed and non-empty
//! 2. Every token occurrence is counted exactly once
//! 3. Percentages sum to 100, or to 0 for an empty count
//! 4. Filtering by the same geography twice changes nothing
//! 5. Role inference never assigns a field that does not exist

use cap_core::aggregate::{count_tokens, distinct_values, filter_records, percentize};
use cap_core::roles::{infer_roles, Role, RoleRules};
use cap_core::schema::{ExtractionTable, Schema};
use cap_core::split::{split_values, SplitMode};
use cap_core::{Collation, FieldValue, Predicate, Record, TokenCounts};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn province_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ON".to_string()),
        Just("BC".to_string()),
        Just("QC".to_string()),
        Just(" AB ".to_string()),
        Just(String::new()),
    ]
}

fn city_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Toronto".to_string()),
        Just("toronto".to_string()),
        Just("Guelph".to_string()),
        Just("Victoria".to_string()),
    ]
}

/// Lever cells with stray delimiters and padding.
fn lever_cell_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z ;,]{0,24}"
}

fn lever_value_strategy() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        lever_cell_strategy().prop_map(FieldValue::Text),
        prop::collection::vec(lever_cell_strategy().prop_map(FieldValue::Text), 0..4)
            .prop_map(FieldValue::List),
        (0i64..5).prop_map(FieldValue::from),
        Just(FieldValue::Absent),
    ]
}

fn action_strategy() -> impl Strategy<Value = Record> {
    (province_strategy(), city_strategy(), lever_value_strategy()).prop_map(
        |(province, city, lever)| {
            let mut record = Record::new()
                .with("Province", province.as_str())
                .with("Municipality", city.as_str());
            record.insert("Policy Lever", lever);
            record
        },
    )
}

fn actions_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(action_strategy(), 0..30)
}

fn schema(records: &[Record]) -> Schema {
    Schema::infer(records, &RoleRules::actions(), ExtractionTable::lever_view())
}

// ============================================================================
// Aggregation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn distinct_values_are_sorted_unique_and_trimmed(actions in actions_strategy()) {
        let schema = schema(&actions);
        for role in [Role::Province, Role::Lever] {
            let values = distinct_values(&actions, &schema, role, Collation::Ordinal);
            for pair in values.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for value in &values {
                prop_assert!(!value.is_empty());
                prop_assert_eq!(value.trim(), value.as_str());
            }
        }
    }

    #[test]
    fn every_token_is_counted_once(actions in actions_strategy()) {
        let schema = schema(&actions);
        let universe = distinct_values(&actions, &schema, Role::Lever, Collation::Ordinal);
        let counts = count_tokens(&actions, &schema, Role::Lever, &universe);

        let expected = actions
            .iter()
            .map(|record| split_values(record.get("Policy Lever"), SplitMode::SemicolonOrComma).len() as u64)
            .sum::<u64>();
        prop_assert_eq!(counts.total(), expected);
        for token in &universe {
            prop_assert!(counts.get(token) > 0);
        }
    }

    #[test]
    fn universe_tokens_always_present(
        actions in actions_strategy(),
        extra in "[A-Z][a-z]{2,8}",
    ) {
        let schema = schema(&actions);
        let universe = vec![extra.clone()];
        let counts = count_tokens(&actions, &schema, Role::Lever, &universe);
        prop_assert!(counts.iter().any(|(token, _)| token == extra));
    }

    #[test]
    fn percentages_sum_to_one_hundred(counts in prop::collection::btree_map("[a-z]{1,6}", 0u64..50, 0..8)) {
        let counts = counts.into_iter().collect::<TokenCounts>();
        let shares = percentize(&counts);

        if counts.total() == 0 {
            prop_assert!(shares.total().abs() < 1e-9);
        } else {
            prop_assert!((shares.total() - 100.0).abs() < 1e-6);
        }
        for (token, _) in counts.iter() {
            let share = shares.get(token);
            prop_assert!((0.0..=100.0).contains(&share));
        }
    }

    #[test]
    fn filtering_by_city_is_idempotent(
        actions in actions_strategy(),
        province in province_strategy(),
        city in city_strategy(),
    ) {
        let schema = schema(&actions);
        let predicates = [
            Predicate::equals(Role::Province, province.trim()),
            Predicate::equals(Role::Municipality, city.as_str()),
        ];

        let once = filter_records(&actions, &schema, &predicates);
        let twice = filter_records(once.iter().copied(), &schema, &predicates);
        prop_assert_eq!(once, twice);
    }
}

// ============================================================================
// Role inference
// ============================================================================

proptest! {
    #[test]
    fn inferred_fields_exist_in_the_sample(names in prop::collection::vec("[A-Za-z ()=0-9]{1,20}", 0..8)) {
        let sample = names
            .iter()
            .fold(Record::new(), |record, name| record.with(name, "x"));

        for rules in [RoleRules::actions(), RoleRules::cities()] {
            let roles = infer_roles(&sample, &rules);
            for (_, field) in roles.assigned() {
                let exists = sample.field_names().any(|name| name == field);
                // Literal fallbacks name a column that may be missing.
                prop_assert!(exists || field == "Province" || field == "Year");
            }
        }
    }

    #[test]
    fn first_matching_field_wins(suffix in "[a-z]{1,6}") {
        let first = format!("Policy Lever {suffix}");
        let sample = Record::new()
            .with(&first, "a")
            .with("Lever", "b");

        let roles = infer_roles(&sample, &RoleRules::actions());
        prop_assert_eq!(roles.field(Role::Lever), Some(first.as_str()));
    }
}
