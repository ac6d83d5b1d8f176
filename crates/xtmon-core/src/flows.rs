//! Failed-flow and replay records
//!
//! Shapes exchanged with the query service for the replay workflow.
//! Field names serialize in camelCase to match the dashboard API.

use crate::error::QueryError;
use crate::table::find_column;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Columns the replay procedure must return
pub const REPLAY_RESULT_COLUMNS: [&str; 6] = [
    "FlowId",
    "FlowIdDerivedFrom",
    "PnlDate",
    "WithBackdated",
    "SkipCoreProcess",
    "Droptabletpm",
];

/// A flow that failed on a given Pnl date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedFlowRow {
    pub flow_id: Option<i64>,
    pub flow_id_derived_from: Option<i64>,
    #[serde(default)]
    pub business_data_type_id: Option<i16>,
    #[serde(default)]
    pub feed_source_id: Option<i16>,
    #[serde(default)]
    pub feed_source_name: Option<String>,
    pub pnl_date: NaiveDate,
    #[serde(default)]
    pub reporting_date: Option<NaiveDate>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub arrival_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub package_guid: Option<Uuid>,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub is_failed: Option<String>,
    #[serde(default)]
    pub type_of_calculation: Option<String>,
    #[serde(default)]
    pub with_backdated: bool,
    #[serde(default)]
    pub skip_core_process: bool,
    #[serde(default)]
    pub droptabletpm: bool,
}

impl FailedFlowRow {
    /// Row with only a Pnl date set
    #[must_use]
    pub fn new(pnl_date: NaiveDate) -> Self {
        Self {
            flow_id: None,
            flow_id_derived_from: None,
            business_data_type_id: None,
            feed_source_id: None,
            feed_source_name: None,
            pnl_date,
            reporting_date: None,
            file_name: None,
            arrival_date: None,
            package_guid: None,
            current_step: None,
            is_failed: None,
            type_of_calculation: None,
            with_backdated: false,
            skip_core_process: false,
            droptabletpm: false,
        }
    }

    /// With flow identifiers
    #[inline]
    #[must_use]
    pub fn with_flow_ids(mut self, flow_id: i64, derived_from: i64) -> Self {
        self.flow_id = Some(flow_id);
        self.flow_id_derived_from = Some(derived_from);
        self
    }

    /// With feed source name
    #[inline]
    #[must_use]
    pub fn with_feed_source(mut self, name: impl Into<String>) -> Self {
        self.feed_source_name = Some(name.into());
        self
    }

    /// With type of calculation
    #[inline]
    #[must_use]
    pub fn with_calculation(mut self, kind: impl Into<String>) -> Self {
        self.type_of_calculation = Some(kind.into());
        self
    }

    /// With source flag defaults
    #[inline]
    #[must_use]
    pub fn with_flags(mut self, with_backdated: bool, skip_core_process: bool, droptabletpm: bool) -> Self {
        self.with_backdated = with_backdated;
        self.skip_core_process = skip_core_process;
        self.droptabletpm = droptabletpm;
        self
    }

    /// Whether the `IsFailed` marker reads as failed (`true` or `1`)
    #[must_use]
    pub fn is_marked_failed(&self) -> bool {
        self.is_failed
            .as_deref()
            .map(str::trim)
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
    }

    /// Both identifiers needed for replay are present
    #[inline]
    #[must_use]
    pub fn has_flow_ids(&self) -> bool {
        self.flow_id.is_some() && self.flow_id_derived_from.is_some()
    }
}

/// One row of a replay request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySubmissionRow {
    pub flow_id_derived_from: i64,
    pub flow_id: i64,
    pub pnl_date: NaiveDate,
    pub with_backdated: bool,
    pub skip_core_process: bool,
    pub droptabletpm: bool,
}

/// One row confirmed by the replay procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayResultRow {
    pub flow_id_derived_from: i64,
    pub flow_id: i64,
    pub pnl_date: NaiveDate,
    pub with_backdated: bool,
    pub skip_core_process: bool,
    pub droptabletpm: bool,
}

/// Check a replay result set header for the required columns
///
/// # Errors
/// - `QueryError::MissingColumns` naming every absent column
pub fn check_result_columns<S: AsRef<str>>(columns: &[S]) -> Result<(), QueryError> {
    let missing: Vec<String> = REPLAY_RESULT_COLUMNS
        .iter()
        .filter(|required| find_column(columns, required).is_none())
        .map(|c| (*c).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(QueryError::MissingColumns(missing))
    }
}
