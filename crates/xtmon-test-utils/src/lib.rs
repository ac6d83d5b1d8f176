//! Testing utilities for XTMon workspace
//!
//! Shared fixtures plus a scripted [`QueryService`] that records every call.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::VecDeque;
use xtmon_core::{
    FailedFlowRow, QueryError, QueryService, ReplayResultRow, ReplaySelectionGrid,
    ReplaySubmissionRow, TabularResult,
};

/// Pnl date used by the fixtures (5 January 2024)
pub fn pnl_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
}

/// Size/disk report with two databases, one of them on two file groups
pub fn sample_report() -> TabularResult {
    let row = |cells: [&str; 4]| cells.iter().map(|c| Some((*c).to_string())).collect();
    TabularResult {
        columns: vec![
            "DatabaseName".into(),
            "FileGroup".into(),
            "UsedSpaceMB".into(),
            "AlertLevel".into(),
        ],
        rows: vec![
            row(["DB2", "PRIMARY", "2048.4", "OK"]),
            row(["DB1", "PRIMARY", "100", "WARNING"]),
            row(["DB1", "LOG", "12", "OK"]),
        ],
    }
}

/// Failed flow with ids `(id, id + 1000)` on [`pnl_date`]
pub fn failed_flow(id: i64, feed_source: &str, calculation: &str) -> FailedFlowRow {
    FailedFlowRow::new(pnl_date())
        .with_flow_ids(id, id + 1000)
        .with_feed_source(feed_source)
        .with_calculation(calculation)
}

/// Failed flow whose `flow_id` is null
pub fn failed_flow_without_id(feed_source: &str) -> FailedFlowRow {
    FailedFlowRow {
        flow_id_derived_from: Some(1),
        ..FailedFlowRow::new(pnl_date()).with_feed_source(feed_source)
    }
}

/// Results the replay procedure would return for a batch
pub fn echo_results(batch: &[ReplaySubmissionRow]) -> Vec<ReplayResultRow> {
    batch
        .iter()
        .map(|r| ReplayResultRow {
            flow_id_derived_from: r.flow_id_derived_from,
            flow_id: r.flow_id,
            pnl_date: r.pnl_date,
            with_backdated: r.with_backdated,
            skip_core_process: r.skip_core_process,
            droptabletpm: r.droptabletpm,
        })
        .collect()
}

/// Grid already loaded with `flows` for [`pnl_date`]
pub fn setup_test_grid(flows: Vec<FailedFlowRow>) -> ReplaySelectionGrid {
    let mut grid = ReplaySelectionGrid::new();
    grid.set_pnl_date_input("05-01-2024");
    let ticket = grid.begin_reload().unwrap();
    grid.complete_reload(ticket, Ok(flows)).unwrap();
    grid
}

/// One recorded call against [`ScriptedQueryService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchMonitoringTable,
    FetchFailedFlows(NaiveDate),
    SubmitReplay(Vec<ReplaySubmissionRow>),
}

/// Query service answering from queued responses
///
/// With an empty queue, fetches fail with a transport error and
/// submissions echo the batch back.
#[derive(Debug, Default)]
pub struct ScriptedQueryService {
    monitoring: Mutex<VecDeque<Result<TabularResult, QueryError>>>,
    failed_flows: Mutex<VecDeque<Result<Vec<FailedFlowRow>, QueryError>>>,
    replays: Mutex<VecDeque<Result<Vec<ReplayResultRow>, QueryError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedQueryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_monitoring(&self, response: Result<TabularResult, QueryError>) -> &Self {
        self.monitoring.lock().push_back(response);
        self
    }

    pub fn push_failed_flows(&self, response: Result<Vec<FailedFlowRow>, QueryError>) -> &Self {
        self.failed_flows.lock().push_back(response);
        self
    }

    pub fn push_replay(&self, response: Result<Vec<ReplayResultRow>, QueryError>) -> &Self {
        self.replays.lock().push_back(response);
        self
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Number of replay submissions so far
    pub fn submit_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::SubmitReplay(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

fn unscripted(what: &str) -> QueryError {
    QueryError::Transport(format!("no scripted {what} response"))
}

#[async_trait]
impl QueryService for ScriptedQueryService {
    async fn fetch_monitoring_table(&self) -> Result<TabularResult, QueryError> {
        self.record(Call::FetchMonitoringTable);
        self.monitoring
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("monitoring")))
    }

    async fn fetch_failed_flows(
        &self,
        pnl_date: NaiveDate,
    ) -> Result<Vec<FailedFlowRow>, QueryError> {
        self.record(Call::FetchFailedFlows(pnl_date));
        self.failed_flows
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("failed flows")))
    }

    async fn submit_replay(
        &self,
        rows: &[ReplaySubmissionRow],
    ) -> Result<Vec<ReplayResultRow>, QueryError> {
        self.record(Call::SubmitReplay(rows.to_vec()));
        self.replays
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(echo_results(rows)))
    }
}
