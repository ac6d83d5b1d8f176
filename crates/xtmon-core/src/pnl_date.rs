//! Pnl (business) date parsing
//!
//! The date field accepts four fixed layouts and is rewritten to the
//! canonical `DD-MM-YYYY` once it parses.

use chrono::NaiveDate;

/// Canonical display layout
pub const DISPLAY_FORMAT: &str = "%d-%m-%Y";

/// Accepted layouts, tried in order: shape mask and chrono format
const ACCEPTED_FORMATS: [(&str, &str); 4] = [
    ("DD-MM-YYYY", "%d-%m-%Y"),
    ("YYYY-MM-DD", "%Y-%m-%d"),
    ("DD/MM/YYYY", "%d/%m/%Y"),
    ("YYYY/MM/DD", "%Y/%m/%d"),
];

/// Parse a Pnl date typed by the user
///
/// Surrounding whitespace is ignored. Returns `None` for empty input, for
/// text matching none of the layouts, and for impossible dates such as
/// `13-13-2024`.
#[must_use]
pub fn normalize_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    ACCEPTED_FORMATS
        .iter()
        .filter(|(mask, _)| matches_mask(text, mask))
        .find_map(|(_, format)| NaiveDate::parse_from_str(text, format).ok())
}

/// Canonical `DD-MM-YYYY` text for a date
#[inline]
#[must_use]
pub fn to_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Parse and re-render in canonical form
#[must_use]
pub fn canonicalize(text: &str) -> Option<String> {
    normalize_date(text).map(to_display)
}

/// Digits where the mask has a letter, identical characters elsewhere
fn matches_mask(text: &str, mask: &str) -> bool {
    text.len() == mask.len()
        && text.bytes().zip(mask.bytes()).all(|(t, m)| {
            if m.is_ascii_alphabetic() {
                t.is_ascii_digit()
            } else {
                t == m
            }
        })
}
