//! Property-based tests for the sifter cleaning stages.
//!
//! These tests use proptest to generate random inputs and check that the
//! stages keep their invariants under all conditions.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p sifter --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p sifter --test property_tests
//! ```

use indexmap::IndexMap;
use proptest::prelude::*;

use sifter::transform::{clean_colname, clean_colnames, MAX_COLUMN_NAME_LEN};
use sifter::{
    Column, Dataset, MissingColumnPolicy, RenamePolicy, RenameRule, TransformEngine,
    TransformOperation, Value,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Arbitrary labels, survey questions included.
fn label() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[a-zA-Z0-9 _\\-\\?\\(\\)/]{0,120}",
        "_c[0-9]{1,2}",
    ]
}

fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::text("")),
        "[a-zA-Z ]{1,8}".prop_map(Value::Text),
        any::<i64>().prop_map(Value::Integer),
    ]
}

/// A dataset with 1..8 uniquely named columns and 0..6 rows.
fn dataset() -> impl Strategy<Value = Dataset> {
    (1usize..8, 0usize..6).prop_flat_map(|(cols, rows)| {
        proptest::collection::vec(proptest::collection::vec(cell(), rows), cols).prop_map(
            move |columns| {
                let columns = columns
                    .into_iter()
                    .enumerate()
                    .map(|(i, values)| Column::new(format!("col{}", i), values))
                    .collect();
                Dataset::with_row_count(columns, rows).expect("valid dataset")
            },
        )
    })
}

fn run(operation: TransformOperation, data: Dataset) -> Dataset {
    TransformEngine::new()
        .apply(&[operation], data)
        .expect("operation failed")
        .0
}

// =============================================================================
// Column Namer Properties
// =============================================================================

proptest! {
    #[test]
    fn clean_colname_is_idempotent(s in label()) {
        let once = clean_colname(&s);
        prop_assert_eq!(clean_colname(&once), once);
    }

    #[test]
    fn clean_colname_output_shape(s in label()) {
        let cleaned = clean_colname(&s);
        prop_assert!(!cleaned.is_empty());
        prop_assert!(cleaned.len() <= MAX_COLUMN_NAME_LEN);
        prop_assert!(cleaned
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_'));
    }

    #[test]
    fn clean_colnames_are_unique(labels in proptest::collection::vec(label(), 0..12)) {
        let cleaned = clean_colnames(&labels);
        prop_assert_eq!(cleaned.len(), labels.len());
        let unique: std::collections::HashSet<&String> = cleaned.iter().collect();
        prop_assert_eq!(unique.len(), cleaned.len());
        prop_assert!(cleaned.iter().all(|c| c.len() <= MAX_COLUMN_NAME_LEN));
    }
}

// =============================================================================
// Stage Properties
// =============================================================================

proptest! {
    #[test]
    fn drop_empty_leaves_no_all_null_column(data in dataset()) {
        let before: Vec<String> = data.column_names().into_iter().map(String::from).collect();
        let after = run(TransformOperation::DropEmptyColumns, data);

        prop_assert!(after.columns().iter().all(|c| !c.is_all_null()));

        // Output order is a subsequence of input order.
        let mut remaining = before.iter();
        for name in after.column_names() {
            prop_assert!(remaining.any(|b| b == name));
        }
    }

    #[test]
    fn rename_without_matches_is_identity(data in dataset()) {
        let expected = data.clone();
        let after = run(
            TransformOperation::RenameByPrefix {
                rules: vec![RenameRule::new("zzz", "renamed")],
                policy: RenamePolicy::Strict,
            },
            data,
        );
        prop_assert_eq!(after, expected);
    }

    #[test]
    fn rename_single_matches(data in dataset()) {
        let count = data.column_count();
        let rules: Vec<RenameRule> = (0..count)
            .map(|i| RenameRule::new(format!("col{}", i), format!("renamed_{}", i)))
            .collect();
        let after = run(
            TransformOperation::RenameByPrefix { rules, policy: RenamePolicy::Strict },
            data,
        );
        for (i, name) in after.column_names().iter().enumerate() {
            prop_assert_eq!(name.to_string(), format!("renamed_{}", i));
        }
    }

    #[test]
    fn empty_to_null_leaves_no_empty_text(data in dataset()) {
        let after = run(TransformOperation::EmptyToNull, data);
        prop_assert!(after
            .columns()
            .iter()
            .all(|c| c.values.iter().all(|v| !v.is_empty_text())));
    }

    #[test]
    fn fill_leaves_no_null_in_filled_columns(data in dataset()) {
        let defaults: IndexMap<String, String> = data
            .column_names()
            .into_iter()
            .map(|name| (name.to_string(), "N/A".to_string()))
            .collect();
        let rows = data.row_count();
        let after = run(TransformOperation::FillNulls { defaults }, data);
        prop_assert_eq!(after.row_count(), rows);
        prop_assert!(after.columns().iter().all(|c| c.non_null_count() == rows));
    }

    #[test]
    fn merge_keeps_rows_and_drops_companions(data in dataset()) {
        let companions: Vec<String> = data
            .column_names()
            .into_iter()
            .skip(1)
            .map(String::from)
            .collect();
        let rows = data.row_count();
        let mut groups = IndexMap::new();
        groups.insert("col0".to_string(), companions);

        let after = run(
            TransformOperation::MergeColumns {
                groups,
                separator: " , ".to_string(),
                policy: MissingColumnPolicy::Fail,
            },
            data,
        );
        prop_assert_eq!(after.column_names(), vec!["col0"]);
        prop_assert_eq!(after.row_count(), rows);
        for value in &after.columns()[0].values {
            prop_assert!(value.is_null() || !value.is_empty_text());
        }
    }
}
