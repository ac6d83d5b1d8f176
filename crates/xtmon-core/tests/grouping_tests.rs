//! Card grouping tests
//!
//! Properties of `group_cards` over generated reports.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use xtmon_core::table::UNKNOWN_GROUP;
use xtmon_core::{group_cards, TabularResult};
use xtmon_test_utils::sample_report;

type Row = (Option<String>, Option<String>, Option<String>);

fn key_cell() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-cA-C_]{1,2}".prop_map(Some),
    ]
}

fn report(has_key: bool, rows: &[Row]) -> TabularResult {
    let key = if has_key { "DatabaseName" } else { "ServerName" };
    TabularResult {
        columns: vec![key.into(), "FileGroup".into(), "UsedSpaceMB".into()],
        rows: rows
            .iter()
            .map(|(k, a, b)| vec![k.clone(), a.clone(), b.clone()])
            .collect(),
    }
}

fn group_name(key: Option<&str>) -> &str {
    match key {
        Some(k) if !k.is_empty() => k,
        _ => UNKNOWN_GROUP,
    }
}

proptest! {
    #[test]
    fn prop_columns_follow_whitelist(
        rows in proptest::collection::vec((key_cell(), proptest::option::of("[0-9]{1,4}"), proptest::option::of("[0-9]{1,4}")), 1..20),
        whitelist in proptest::sample::subsequence(vec!["AlertLevel", "UsedSpaceMB", "FileGroup", "Missing"], 0..=4).prop_shuffle(),
    ) {
        let result = report(true, &rows);
        let expected: Vec<String> = whitelist
            .iter()
            .filter(|w| result.columns.iter().any(|c| c == *w))
            .map(|w| (*w).to_string())
            .collect();

        for card in group_cards(&result, "DatabaseName", &whitelist) {
            prop_assert_eq!(&card.columns, &expected);
            prop_assert!(card.rows.iter().all(|r| r.len() == expected.len()));
        }
    }

    #[test]
    fn prop_missing_key_column_yields_nothing(
        rows in proptest::collection::vec((key_cell(), Just(None), Just(None)), 0..20),
    ) {
        let result = report(false, &rows);
        prop_assert!(group_cards(&result, "DatabaseName", &["FileGroup"]).is_empty());
    }

    #[test]
    fn prop_cards_sorted_and_rows_stable(
        rows in proptest::collection::vec((key_cell(), proptest::option::of("[0-9]{1,4}"), Just(None)), 0..30),
    ) {
        let result = report(true, &rows);
        let cards = group_cards(&result, "DatabaseName", &["FileGroup"]);

        let folded: Vec<String> = cards.iter().map(|c| c.name.to_uppercase()).collect();
        prop_assert!(folded.windows(2).all(|w| w[0] <= w[1]));

        let total: usize = cards.iter().map(|c| c.rows.len()).sum();
        prop_assert_eq!(total, rows.len());

        for card in &cards {
            let expected: Vec<Vec<Option<String>>> = rows
                .iter()
                .filter(|(k, _, _)| group_name(k.as_deref()) == card.name)
                .map(|(_, a, _)| vec![a.clone()])
                .collect();
            prop_assert_eq!(&card.rows, &expected);
        }
    }
}

#[test]
fn groups_sample_report() {
    let cards = group_cards(&sample_report(), "DatabaseName", &["UsedSpaceMB", "FileGroup"]);

    let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["DB1", "DB2"]);
    assert_eq!(cards[0].columns, vec!["UsedSpaceMB", "FileGroup"]);
    assert_eq!(
        cards[0].rows,
        vec![
            vec![Some("100".to_string()), Some("PRIMARY".to_string())],
            vec![Some("12".to_string()), Some("LOG".to_string())],
        ]
    );
}

#[test]
fn key_column_matches_case_insensitively() {
    let cards = group_cards(&sample_report(), "databasename", &["filegroup"]);
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[1].columns, vec!["filegroup"]);
}

#[test]
fn empty_report_has_no_cards() {
    let result = TabularResult {
        columns: vec!["DatabaseName".into()],
        rows: Vec::new(),
    };
    assert!(group_cards(&result, "DatabaseName", &["FileGroup"]).is_empty());
}
