//! Failed-flow replay grid
//!
//! Holds the failed flows loaded for one Pnl date, the per-row selection and
//! replay flags, the two categorical filters, and the submission workflow.
//!
//! # Lifecycle
//!
//! ```text
//! Empty ──reload──▶ Loading ──ok──▶ Loaded ──submit──▶ Submitting ──▶ Loaded
//!                      │                                   (results or error)
//!                      └──err──▶ LoadFailed
//! ```
//!
//! External calls are split into `begin_*` (validate, issue a ticket) and
//! `complete_*` (apply the outcome) so a caller can drive them from any
//! event loop. A reload ticket older than the most recent one is dropped on
//! completion.

use crate::error::{GridError, QueryError, ValidationError};
use crate::flows::{FailedFlowRow, ReplayResultRow, ReplaySubmissionRow};
use crate::monitoring::Completion;
use crate::pnl_date::{normalize_date, to_display};
use crate::source::QueryService;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeSet, HashSet};

/// Stable identity of a grid row within one load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey(u64);

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A loaded failed flow plus its editable UI state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    key: RowKey,
    source: FailedFlowRow,
    is_selected: bool,
    skip_core_process: bool,
    droptabletpm: bool,
}

impl GridRow {
    fn new(key: RowKey, source: FailedFlowRow) -> Self {
        Self {
            key,
            is_selected: false,
            skip_core_process: source.skip_core_process,
            droptabletpm: source.droptabletpm,
            source,
        }
    }

    /// Row identity
    #[inline]
    #[must_use]
    pub fn key(&self) -> RowKey {
        self.key
    }

    /// Row as returned by the query service
    #[inline]
    #[must_use]
    pub fn source(&self) -> &FailedFlowRow {
        &self.source
    }

    /// Whether the row is part of the next submission
    #[inline]
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    /// Current (possibly edited) skip-core-process flag
    #[inline]
    #[must_use]
    pub fn skip_core_process(&self) -> bool {
        self.skip_core_process
    }

    /// Current (possibly edited) drop-table-tpm flag
    #[inline]
    #[must_use]
    pub fn droptabletpm(&self) -> bool {
        self.droptabletpm
    }

    fn to_submission(&self) -> Option<ReplaySubmissionRow> {
        Some(ReplaySubmissionRow {
            flow_id_derived_from: self.source.flow_id_derived_from?,
            flow_id: self.source.flow_id?,
            pnl_date: self.source.pnl_date,
            with_backdated: self.source.with_backdated,
            skip_core_process: self.skip_core_process,
            droptabletpm: self.droptabletpm,
        })
    }

    fn matches(&self, feed_source: Option<&str>, calc_type: Option<&str>) -> bool {
        field_matches(self.source.feed_source_name.as_deref(), feed_source)
            && field_matches(self.source.type_of_calculation.as_deref(), calc_type)
    }
}

fn field_matches(value: Option<&str>, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(wanted) => value.is_some_and(|v| v.to_lowercase() == wanted.to_lowercase()),
    }
}

/// Grid phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPhase {
    /// Nothing requested yet
    Empty,
    /// Fetch in flight
    Loading,
    /// Rows available
    Loaded,
    /// Last fetch failed; no rows
    LoadFailed,
    /// Replay submission in flight
    Submitting,
}

/// Dismissible status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Message text
    pub text: String,
    /// Error or success styling
    pub is_error: bool,
}

impl StatusMessage {
    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }
}

/// Handle for one issued failed-flow fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a reload ticket must be completed"]
pub struct ReloadTicket {
    generation: u64,
    pnl_date: NaiveDate,
}

impl ReloadTicket {
    /// Date to fetch
    #[inline]
    #[must_use]
    pub fn pnl_date(&self) -> NaiveDate {
        self.pnl_date
    }
}

/// Handle for one issued replay submission
#[derive(Debug)]
#[must_use = "a submit ticket must be completed"]
pub struct SubmitTicket {
    keys: Vec<RowKey>,
    batch: Vec<ReplaySubmissionRow>,
}

impl SubmitTicket {
    /// Rows to send, in grid order
    #[inline]
    #[must_use]
    pub fn batch(&self) -> &[ReplaySubmissionRow] {
        &self.batch
    }
}

/// Selection grid for replaying failed flows
#[derive(Debug, Clone)]
pub struct ReplaySelectionGrid {
    pnl_date_input: String,
    pnl_date_error: Option<String>,
    feed_source_filter: Option<String>,
    calc_type_filter: Option<String>,
    rows: Vec<GridRow>,
    replay_results: Vec<ReplayResultRow>,
    phase: GridPhase,
    has_loaded: bool,
    load_error: Option<String>,
    status: Option<StatusMessage>,
    last_refresh: Option<DateTime<Utc>>,
    last_pnl_date: Option<NaiveDate>,
    generation: u64,
    next_key: u64,
}

impl Default for ReplaySelectionGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplaySelectionGrid {
    /// Create an empty grid
    #[must_use]
    pub fn new() -> Self {
        Self {
            pnl_date_input: String::new(),
            pnl_date_error: None,
            feed_source_filter: None,
            calc_type_filter: None,
            rows: Vec::new(),
            replay_results: Vec::new(),
            phase: GridPhase::Empty,
            has_loaded: false,
            load_error: None,
            status: None,
            last_refresh: None,
            last_pnl_date: None,
            generation: 0,
            next_key: 0,
        }
    }

    // ---------------------------------------------------------------------
    // Pnl date input
    // ---------------------------------------------------------------------

    /// Store the raw date text; validated only on blur or reload
    pub fn set_pnl_date_input(&mut self, text: impl Into<String>) {
        self.pnl_date_input = text.into();
        self.pnl_date_error = None;
        self.status = None;
    }

    /// Rewrite the input to `DD-MM-YYYY` if it parses
    pub fn blur_pnl_date(&mut self) -> bool {
        match normalize_date(&self.pnl_date_input) {
            Some(date) => {
                self.pnl_date_input = to_display(date);
                self.status = None;
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Reload
    // ---------------------------------------------------------------------

    /// Fetch failed flows for the entered date
    ///
    /// # Errors
    /// - `GridError::Validation` if the date does not parse
    /// - `GridError::Busy` while a submission is in flight
    /// - `GridError::Transport` if the fetch failed (rows are cleared)
    pub async fn reload(&mut self, service: &dyn QueryService) -> Result<Completion, GridError> {
        let ticket = self.begin_reload()?;
        let outcome = service.fetch_failed_flows(ticket.pnl_date()).await;
        self.complete_reload(ticket, outcome)
    }

    /// Validate the date and mark a fetch as issued
    ///
    /// Nothing visible changes besides the loading flag until the fetch
    /// completes.
    ///
    /// # Errors
    /// - `GridError::Validation` if the date does not parse
    /// - `GridError::Busy` while a submission is in flight
    pub fn begin_reload(&mut self) -> Result<ReloadTicket, GridError> {
        if self.phase == GridPhase::Submitting {
            return Err(GridError::Busy { operation: "reload" });
        }
        let Some(pnl_date) = normalize_date(&self.pnl_date_input) else {
            let err = ValidationError::InvalidPnlDate;
            self.pnl_date_error = Some(err.to_string());
            tracing::debug!("Rejected Pnl date input {:?}", self.pnl_date_input);
            return Err(err.into());
        };

        self.pnl_date_error = None;
        self.pnl_date_input = to_display(pnl_date);
        self.load_error = None;
        self.status = None;
        self.phase = GridPhase::Loading;
        self.generation += 1;
        tracing::info!("Fetching failed flows for {} (request {})", pnl_date, self.generation);

        Ok(ReloadTicket {
            generation: self.generation,
            pnl_date,
        })
    }

    /// Apply the outcome of an issued fetch
    ///
    /// # Errors
    /// - `GridError::Transport` if the fetch failed; rows are cleared and
    ///   the message is kept as the load error
    pub fn complete_reload(
        &mut self,
        ticket: ReloadTicket,
        outcome: Result<Vec<FailedFlowRow>, QueryError>,
    ) -> Result<Completion, GridError> {
        if ticket.generation != self.generation || self.phase != GridPhase::Loading {
            tracing::debug!("Dropping superseded failed-flow fetch {}", ticket.generation);
            return Ok(Completion::Superseded);
        }

        match outcome {
            Ok(flows) => {
                let rows: Vec<GridRow> = flows
                    .into_iter()
                    .map(|source| {
                        let key = RowKey(self.next_key);
                        self.next_key += 1;
                        GridRow::new(key, source)
                    })
                    .collect();
                tracing::info!("Loaded {} failed flows for {}", rows.len(), ticket.pnl_date);
                self.rows = rows;
                self.replay_results.clear();
                self.has_loaded = true;
                self.last_refresh = Some(Utc::now());
                self.last_pnl_date = Some(ticket.pnl_date);
                self.phase = GridPhase::Loaded;
                Ok(Completion::Applied)
            }
            Err(e) => {
                tracing::warn!("Failed-flow fetch for {} failed: {}", ticket.pnl_date, e);
                self.load_error = Some(e.to_string());
                self.rows.clear();
                self.has_loaded = false;
                self.phase = GridPhase::LoadFailed;
                Err(GridError::Transport(e))
            }
        }
    }

    // ---------------------------------------------------------------------
    // Selection and edits
    // ---------------------------------------------------------------------

    /// Select every row in the filtered view
    ///
    /// Rows hidden by the filters keep their selection. Returns the number
    /// of rows that were newly selected.
    ///
    /// # Errors
    /// - `GridError::Busy` while loading or submitting
    pub fn select_all(&mut self) -> Result<usize, GridError> {
        if self.is_busy() {
            return Err(GridError::Busy { operation: "select all" });
        }
        let (feed, calc) = (self.feed_source_filter.clone(), self.calc_type_filter.clone());
        let mut newly = 0;
        for row in self
            .rows
            .iter_mut()
            .filter(|r| r.matches(feed.as_deref(), calc.as_deref()))
        {
            if !row.is_selected {
                row.is_selected = true;
                newly += 1;
            }
        }
        Ok(newly)
    }

    /// Flip one row's selection, returning the new state
    ///
    /// # Errors
    /// - `GridError::Busy` while loading or submitting
    /// - `GridError::RowNotFound` for an unknown key
    pub fn toggle_row(&mut self, key: RowKey) -> Result<bool, GridError> {
        if self.is_busy() {
            return Err(GridError::Busy { operation: "toggle row" });
        }
        let row = self.row_mut(key)?;
        row.is_selected = !row.is_selected;
        Ok(row.is_selected)
    }

    /// Edit the skip-core-process flag of a selected row
    ///
    /// # Errors
    /// - `GridError::Busy` while submitting
    /// - `GridError::RowNotFound` / `GridError::RowNotSelected`
    pub fn set_skip_core_process(&mut self, key: RowKey, value: bool) -> Result<(), GridError> {
        self.editable_row(key)?.skip_core_process = value;
        Ok(())
    }

    /// Edit the drop-table-tpm flag of a selected row
    ///
    /// # Errors
    /// - `GridError::Busy` while submitting
    /// - `GridError::RowNotFound` / `GridError::RowNotSelected`
    pub fn set_droptabletpm(&mut self, key: RowKey, value: bool) -> Result<(), GridError> {
        self.editable_row(key)?.droptabletpm = value;
        Ok(())
    }

    fn editable_row(&mut self, key: RowKey) -> Result<&mut GridRow, GridError> {
        if self.phase == GridPhase::Submitting {
            return Err(GridError::Busy { operation: "edit flags" });
        }
        let row = self.row_mut(key)?;
        if !row.is_selected {
            return Err(GridError::RowNotSelected(key));
        }
        Ok(row)
    }

    fn row_mut(&mut self, key: RowKey) -> Result<&mut GridRow, GridError> {
        self.rows
            .iter_mut()
            .find(|r| r.key == key)
            .ok_or(GridError::RowNotFound(key))
    }

    // ---------------------------------------------------------------------
    // Filters
    // ---------------------------------------------------------------------

    /// Set both filters; `None` or empty text matches everything
    pub fn set_filter(&mut self, feed_source: Option<&str>, calc_type: Option<&str>) {
        self.feed_source_filter = non_empty(feed_source);
        self.calc_type_filter = non_empty(calc_type);
    }

    /// Active feed source filter
    #[inline]
    #[must_use]
    pub fn feed_source_filter(&self) -> Option<&str> {
        self.feed_source_filter.as_deref()
    }

    /// Active calculation type filter
    #[inline]
    #[must_use]
    pub fn calc_type_filter(&self) -> Option<&str> {
        self.calc_type_filter.as_deref()
    }

    /// Rows passing the active filters, in load order
    pub fn filtered_rows(&self) -> impl Iterator<Item = &GridRow> + '_ {
        let feed = self.feed_source_filter.as_deref();
        let calc = self.calc_type_filter.as_deref();
        self.rows.iter().filter(move |r| r.matches(feed, calc))
    }

    /// Number of rows passing the active filters
    #[must_use]
    pub fn filtered_count(&self) -> usize {
        self.filtered_rows().count()
    }

    /// Distinct feed sources in the unfiltered set, ascending
    #[must_use]
    pub fn feed_source_options(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|r| r.source.feed_source_name.as_deref()))
    }

    /// Distinct calculation types in the unfiltered set, ascending
    #[must_use]
    pub fn type_of_calculation_options(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|r| r.source.type_of_calculation.as_deref()))
    }

    // ---------------------------------------------------------------------
    // Submission
    // ---------------------------------------------------------------------

    /// Replay every selected row
    ///
    /// Returns the number of rows submitted.
    ///
    /// # Errors
    /// - `GridError::Validation` if nothing is loaded, nothing is selected,
    ///   or a selected row lacks flow ids
    /// - `GridError::Busy` while loading or submitting
    /// - `GridError::Transport` if the service rejected the batch
    pub async fn submit(&mut self, service: &dyn QueryService) -> Result<usize, GridError> {
        let ticket = self.begin_submit()?;
        let outcome = service.submit_replay(ticket.batch()).await;
        self.complete_submit(ticket, outcome)
    }

    /// Validate the selection and build the batch
    ///
    /// On a validation failure nothing is sent and no row changes.
    ///
    /// # Errors
    /// - see [`ReplaySelectionGrid::submit`]
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, GridError> {
        if self.is_busy() {
            return Err(GridError::Busy { operation: "submit" });
        }
        if !self.has_loaded {
            return Err(self.reject(ValidationError::NotLoaded));
        }

        let selected: Vec<&GridRow> = self.rows.iter().filter(|r| r.is_selected).collect();
        if selected.is_empty() {
            return Err(self.reject(ValidationError::EmptySelection));
        }

        let batch: Vec<ReplaySubmissionRow> =
            selected.iter().filter_map(|r| r.to_submission()).collect();
        if batch.len() != selected.len() {
            let count = selected.len() - batch.len();
            return Err(self.reject(ValidationError::MissingFlowIds { count }));
        }

        let keys = selected.iter().map(|r| r.key).collect();
        self.status = None;
        self.phase = GridPhase::Submitting;
        tracing::info!("Submitting {} flow(s) for replay", batch.len());
        Ok(SubmitTicket { keys, batch })
    }

    /// Apply the outcome of an issued submission
    ///
    /// # Errors
    /// - `GridError::Transport` if the service failed; rows are untouched
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<Vec<ReplayResultRow>, QueryError>,
    ) -> Result<usize, GridError> {
        self.phase = GridPhase::Loaded;
        match outcome {
            Ok(results) => {
                let submitted: HashSet<RowKey> = ticket.keys.into_iter().collect();
                self.rows.retain(|r| !submitted.contains(&r.key));
                self.replay_results.extend(results);
                let count = submitted.len();
                self.status = Some(StatusMessage::success(format!(
                    "Submitted {count} row(s) for replay."
                )));
                tracing::info!("Replay accepted for {} row(s)", count);
                Ok(count)
            }
            Err(e) => {
                tracing::warn!("Replay submission failed: {}", e);
                self.status = Some(StatusMessage::error(e.to_string()));
                Err(GridError::Transport(e))
            }
        }
    }

    fn reject(&mut self, err: ValidationError) -> GridError {
        tracing::debug!("Submission rejected: {}", err);
        self.status = Some(StatusMessage::error(err.to_string()));
        err.into()
    }

    // ---------------------------------------------------------------------
    // Status and views
    // ---------------------------------------------------------------------

    /// Clear the status line
    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    /// Current status line
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Raw date text
    #[inline]
    #[must_use]
    pub fn pnl_date_input(&self) -> &str {
        &self.pnl_date_input
    }

    /// Inline date error
    #[inline]
    #[must_use]
    pub fn pnl_date_error(&self) -> Option<&str> {
        self.pnl_date_error.as_deref()
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> GridPhase {
        self.phase
    }

    /// Fetch in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == GridPhase::Loading
    }

    /// Submission in flight
    #[inline]
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.phase == GridPhase::Submitting
    }

    fn is_busy(&self) -> bool {
        self.is_loading() || self.is_submitting()
    }

    /// A fetch has succeeded and not been replaced by a failure
    #[inline]
    #[must_use]
    pub fn has_loaded(&self) -> bool {
        self.has_loaded
    }

    /// Message of the last failed fetch
    #[inline]
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// All rows in the working set
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Row by key
    #[must_use]
    pub fn row(&self, key: RowKey) -> Option<&GridRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Rows confirmed by replay submissions since the last load
    #[inline]
    #[must_use]
    pub fn replay_results(&self) -> &[ReplayResultRow] {
        &self.replay_results
    }

    /// Rows in the working set, ignoring filters
    #[inline]
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Selected rows, ignoring filters
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_selected).count()
    }

    /// Whether "select all" is enabled
    #[must_use]
    pub fn can_select_all(&self) -> bool {
        !self.is_busy() && self.filtered_rows().next().is_some()
    }

    /// Whether "submit" is enabled
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_busy() && self.selected_count() > 0
    }

    /// Time of the last successful fetch
    #[inline]
    #[must_use]
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    /// Date used by the last successful fetch
    #[inline]
    #[must_use]
    pub fn last_pnl_date(&self) -> Option<NaiveDate> {
        self.last_pnl_date
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
