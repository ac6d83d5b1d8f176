use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use xtmon_core::normalize_date;
use xtmon_core::pnl_date::{canonicalize, to_display};

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (1000i32..=9999, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #[test]
    fn prop_every_layout_round_trips(date in any_date()) {
        let (y, m, d) = (date.year(), date.month(), date.day());
        for text in [
            format!("{d:02}-{m:02}-{y:04}"),
            format!("{y:04}-{m:02}-{d:02}"),
            format!("{d:02}/{m:02}/{y:04}"),
            format!("{y:04}/{m:02}/{d:02}"),
        ] {
            prop_assert_eq!(normalize_date(&text), Some(date));
        }
    }

    #[test]
    fn prop_canonical_text_is_a_fixed_point(date in any_date()) {
        let shown = to_display(date);
        prop_assert_eq!(canonicalize(&shown), Some(shown.clone()));
    }

    #[test]
    fn prop_single_digit_parts_rejected(d in 1u32..=9, m in 1u32..=9, y in 1000i32..=9999) {
        let text = format!("{d}-{m}-{y}");
        prop_assert_eq!(normalize_date(&text), None);
    }

    #[test]
    fn prop_arbitrary_text_never_panics(text in "\\PC{0,16}") {
        let _ = normalize_date(&text);
    }
}

#[test]
fn day_first_wins_for_ambiguous_layout() {
    assert_eq!(
        normalize_date("02-03-2024"),
        NaiveDate::from_ymd_opt(2024, 3, 2)
    );
}
