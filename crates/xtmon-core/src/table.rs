//! Tabular results and card grouping
//!
//! The report procedure returns a generic `{columns, rows}` set with every
//! cell pre-stringified. [`group_cards`] turns it into one [`Card`] per value
//! of a key column, keeping only whitelisted columns.

use crate::error::TableError;
use crate::format::AlertLevel;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key used for rows whose key cell is null, empty or missing
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Column carrying the OK/WARNING/CRITICAL classification
pub const ALERT_LEVEL_COLUMN: &str = "AlertLevel";

/// Generic result set: column names plus nullable string cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularResult {
    /// Column names, matched case-insensitively
    pub columns: Vec<String>,
    /// Rows, one cell per column
    pub rows: Vec<Vec<Option<String>>>,
}

impl TabularResult {
    /// Create a result, checking that every row matches the column count
    ///
    /// # Errors
    /// - `TableError::RaggedRow` for the first row of the wrong length
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Vec<Option<String>>>,
    ) -> Result<Self, TableError> {
        let result = Self { columns, rows };
        result.validate()?;
        Ok(result)
    }

    /// Check the row-length invariant
    ///
    /// # Errors
    /// - `TableError::RaggedRow` for the first row of the wrong length
    pub fn validate(&self) -> Result<(), TableError> {
        let expected = self.columns.len();
        match self.rows.iter().position(|row| row.len() != expected) {
            Some(row) => Err(TableError::RaggedRow {
                row,
                expected,
                actual: self.rows[row].len(),
            }),
            None => Ok(()),
        }
    }

    /// Index of a column, ignoring case
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        find_column(&self.columns, name)
    }

    /// Whether the result has no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One group of rows sharing a key value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Key value, or [`UNKNOWN_GROUP`]
    pub name: String,
    /// Projected columns in whitelist order
    pub columns: Vec<String>,
    /// Projected rows in source order
    pub rows: Vec<Vec<Option<String>>>,
}

impl Card {
    /// Alert level of a row, if the card shows an alert column
    #[must_use]
    pub fn alert_level(&self, row: usize) -> AlertLevel {
        find_column(&self.columns, ALERT_LEVEL_COLUMN)
            .and_then(|idx| self.rows.get(row)?.get(idx)?.as_deref())
            .map_or(AlertLevel::Unknown, |v| AlertLevel::classify(Some(v)))
    }

    /// Worst alert level across the card
    #[must_use]
    pub fn worst_alert(&self) -> AlertLevel {
        (0..self.rows.len())
            .map(|row| self.alert_level(row))
            .max()
            .unwrap_or(AlertLevel::Unknown)
    }
}

/// Group a result into cards keyed by `key_column`
///
/// Returns an empty vector when the key column is absent. Cards are sorted
/// by upper-cased name, so `_` sorts after letters; rows inside a card keep
/// source order.
#[must_use]
pub fn group_cards<S: AsRef<str>>(
    result: &TabularResult,
    key_column: &str,
    whitelist: &[S],
) -> Vec<Card> {
    let Some(key_idx) = result.column_index(key_column) else {
        tracing::debug!("Key column {} absent, no cards", key_column);
        return Vec::new();
    };

    let projected: Vec<(&str, usize)> = whitelist
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|name| result.column_index(name).map(|idx| (name, idx)))
        .collect();

    let mut groups: IndexMap<String, Vec<Vec<Option<String>>>> = IndexMap::new();
    for row in &result.rows {
        let key = match row.get(key_idx).and_then(Option::as_deref) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => UNKNOWN_GROUP.to_string(),
        };
        let cells = projected
            .iter()
            .map(|(_, idx)| row.get(*idx).cloned().flatten())
            .collect();
        groups.entry(key).or_default().push(cells);
    }

    let columns: Vec<String> = projected.iter().map(|(name, _)| (*name).to_string()).collect();
    let mut cards: Vec<Card> = groups
        .into_iter()
        .map(|(name, rows)| Card {
            name,
            columns: columns.clone(),
            rows,
        })
        .collect();
    cards.sort_by_cached_key(|card| card.name.to_uppercase());
    cards
}

pub(crate) fn find_column<S: AsRef<str>>(columns: &[S], name: &str) -> Option<usize> {
    let wanted = name.to_lowercase();
    columns
        .iter()
        .position(|c| c.as_ref().to_lowercase() == wanted)
}
