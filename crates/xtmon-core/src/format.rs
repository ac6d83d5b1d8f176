//! Presentation helpers
//!
//! Header labels, cell values and alert classification for monitoring
//! cards, plus the small formatters used by the replay grid.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder for missing values
pub const EMPTY_CELL: &str = "-";

/// Split a camelCase/PascalCase column name into words
///
/// `"DatabaseName"` becomes `"Database Name"`, `"DBSize"` becomes
/// `"DB Size"`.
#[must_use]
pub fn to_header_label(column: &str) -> String {
    if column.trim().is_empty() {
        return String::new();
    }

    let chars: Vec<char> = column.chars().collect();
    let mut label = String::with_capacity(column.len() + 4);
    for (i, &current) in chars.iter().enumerate() {
        if i > 0 && current.is_uppercase() {
            let previous = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if previous.is_lowercase() || (previous.is_uppercase() && next_is_lower) {
                label.push(' ');
            }
        }
        label.push(current);
    }
    label
}

/// Format a monitoring cell for display
///
/// Numbers get space-separated thousands; columns whose name contains `MB`
/// are rounded to whole megabytes and suffixed.
#[must_use]
pub fn format_cell_value(value: Option<&str>, column: &str) -> String {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return EMPTY_CELL.to_string();
    };
    let text = raw.trim();
    if !is_numeric(text) {
        return raw.to_string();
    }

    let megabytes = column.to_uppercase().contains("MB");
    if let Ok(int) = text.parse::<i64>() {
        let grouped = group_thousands(int);
        return if megabytes { format!("{grouped} MB") } else { grouped };
    }

    // Decimal, or an integer too large for i64.
    let Ok(number) = text.parse::<f64>() else {
        return raw.to_string();
    };
    if megabytes {
        let whole = number.round();
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let grouped = if whole.abs() < i64::MAX as f64 {
            group_thousands(whole as i64)
        } else {
            // Beyond i64: group the f64's own integer digits.
            group_digits(&format!("{:.0}", whole.abs()), whole < 0.0)
        };
        return format!("{grouped} MB");
    }
    format_decimal(number)
}

/// Space-separated thousands: `1234567` becomes `"1 234 567"`
#[must_use]
pub fn group_thousands(value: i64) -> String {
    group_digits(&value.unsigned_abs().to_string(), value < 0)
}

fn group_digits(digits: &str, negative: bool) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}

fn format_decimal(number: f64) -> String {
    let fixed = format!("{:.3}", number.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if number < 0.0 && (int_part.trim_start_matches('0') != "" || !frac.is_empty()) {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn is_numeric(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match frac_part {
        None => !int_part.is_empty() && all_digits(int_part),
        Some(frac) => {
            (!int_part.is_empty() || !frac.is_empty()) && all_digits(int_part) && all_digits(frac)
        }
    }
}

/// Alert classification of a monitoring row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertLevel {
    /// Missing or unrecognized value
    Unknown,
    /// `OK`
    Ok,
    /// `WARNING`
    Warning,
    /// `CRITICAL`
    Critical,
}

impl AlertLevel {
    /// Classify a raw cell, ignoring case and surrounding whitespace
    #[must_use]
    pub fn classify(value: Option<&str>) -> Self {
        let Some(v) = value else {
            return Self::Unknown;
        };
        match v.trim().to_uppercase().as_str() {
            "OK" => Self::Ok,
            "WARNING" => Self::Warning,
            "CRITICAL" => Self::Critical,
            _ => Self::Unknown,
        }
    }

    /// Whether the whole row should be highlighted
    #[inline]
    #[must_use]
    pub fn highlights_row(self) -> bool {
        matches!(self, Self::Warning | Self::Critical)
    }

    /// Canonical label
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text cell, `"-"` when blank
#[must_use]
pub fn format_text(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => EMPTY_CELL.to_string(),
    }
}

/// Boolean cell as `Yes`/`No`
#[inline]
#[must_use]
pub fn format_flag(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Date cell as `DD-MM-YYYY`, `"-"` when absent
#[must_use]
pub fn format_date(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| EMPTY_CELL.to_string(), crate::pnl_date::to_display)
}

/// Integer cell with grouped thousands, `"-"` when absent
#[must_use]
pub fn format_number(value: Option<i64>) -> String {
    value.map_or_else(|| EMPTY_CELL.to_string(), group_thousands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_labels() {
        assert_eq!(to_header_label("AlertLevel"), "Alert Level");
        assert_eq!(to_header_label("DatabaseName"), "Database Name");
        assert_eq!(to_header_label("DBSize"), "DB Size");
        assert_eq!(to_header_label("AllocatedSpaceMB"), "Allocated Space MB");
        assert_eq!(to_header_label("fileGroup"), "file Group");
        assert_eq!(to_header_label("Autogrow"), "Autogrow");
        assert_eq!(to_header_label("  "), "");
    }

    #[test]
    fn megabyte_columns() {
        assert_eq!(format_cell_value(Some("1234"), "UsedSpaceMB"), "1 234 MB");
        assert_eq!(format_cell_value(Some("1000.6"), "FreeDriveMb"), "1 001 MB");
        assert_eq!(format_cell_value(Some("512"), "PartSizeMB"), "512 MB");
    }

    #[test]
    fn megabytes_beyond_i64_keep_their_digits() {
        assert_eq!(
            format_cell_value(Some("99999999999999999999"), "UsedSpaceMB"),
            "100 000 000 000 000 000 000 MB"
        );
        assert_eq!(
            format_cell_value(Some("-12345678901234567890.4"), "FreeSpaceMB"),
            "-12 345 678 901 234 567 168 MB"
        );
    }

    #[test]
    fn plain_numbers() {
        assert_eq!(format_cell_value(Some("1234567"), "Count"), "1 234 567");
        assert_eq!(format_cell_value(Some("-1234"), "Delta"), "-1 234");
        assert_eq!(format_cell_value(Some("1234.5"), "Ratio"), "1 234.5");
        assert_eq!(format_cell_value(Some("0.12345"), "Ratio"), "0.123");
        assert_eq!(format_cell_value(Some("12.00"), "Ratio"), "12");
    }

    #[test]
    fn non_numeric_and_missing() {
        assert_eq!(format_cell_value(None, "Anything"), "-");
        assert_eq!(format_cell_value(Some(""), "Anything"), "-");
        assert_eq!(format_cell_value(Some("   "), "Anything"), "-");
        assert_eq!(format_cell_value(Some("abc"), "Name"), "abc");
        assert_eq!(format_cell_value(Some("12abc"), "SizeMB"), "12abc");
        assert_eq!(format_cell_value(Some("1e5"), "Name"), "1e5");
        assert_eq!(format_cell_value(Some("."), "Name"), ".");
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1 000");
        assert_eq!(group_thousands(-1_000_000), "-1 000 000");
        assert_eq!(group_thousands(i64::MIN), "-9 223 372 036 854 775 808");
    }

    #[test]
    fn alert_levels() {
        assert_eq!(AlertLevel::classify(Some(" ok ")), AlertLevel::Ok);
        assert_eq!(AlertLevel::classify(Some("Warning")), AlertLevel::Warning);
        assert_eq!(AlertLevel::classify(Some("CRITICAL")), AlertLevel::Critical);
        assert_eq!(AlertLevel::classify(Some("degraded")), AlertLevel::Unknown);
        assert_eq!(AlertLevel::classify(None), AlertLevel::Unknown);

        assert!(AlertLevel::Critical.highlights_row());
        assert!(AlertLevel::Warning.highlights_row());
        assert!(!AlertLevel::Ok.highlights_row());
        assert!(AlertLevel::Critical > AlertLevel::Warning);
    }

    #[test]
    fn replay_formatters() {
        assert_eq!(format_text(Some("Loader")), "Loader");
        assert_eq!(format_text(Some(" ")), "-");
        assert_eq!(format_text(None), "-");
        assert_eq!(format_flag(true), "Yes");
        assert_eq!(format_flag(false), "No");
        assert_eq!(
            format_date(NaiveDate::from_ymd_opt(2024, 1, 5)),
            "05-01-2024"
        );
        assert_eq!(format_date(None), "-");
        assert_eq!(format_number(Some(42_000)), "42 000");
        assert_eq!(format_number(None), "-");
    }
}
