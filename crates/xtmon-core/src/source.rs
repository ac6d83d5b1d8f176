//! Query service seam
//!
//! The dashboard never talks to the database itself; everything goes
//! through a [`QueryService`]. [`SnapshotQueryService`] serves previously
//! captured JSON payloads and refuses writes.

use crate::config::{MonitoringConfig, ReplayConfig, XtmonConfig};
use crate::error::QueryError;
use crate::flows::{FailedFlowRow, ReplayResultRow, ReplaySubmissionRow};
use crate::table::TabularResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

/// Data access used by the monitoring board and the replay grid
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Run the database size/disk report
    async fn fetch_monitoring_table(&self) -> Result<TabularResult, QueryError>;

    /// Failed flows for one Pnl date
    async fn fetch_failed_flows(&self, pnl_date: NaiveDate)
        -> Result<Vec<FailedFlowRow>, QueryError>;

    /// Submit a non-empty replay batch
    ///
    /// The returned rows are authoritative and need not echo the batch.
    async fn submit_replay(
        &self,
        rows: &[ReplaySubmissionRow],
    ) -> Result<Vec<ReplayResultRow>, QueryError>;
}

/// Read-only service over captured JSON payloads
///
/// Stands in for the configured procedures and applies their command
/// timeouts to snapshot reads.
#[derive(Debug, Clone)]
pub struct SnapshotQueryService {
    monitoring_config: MonitoringConfig,
    replay_config: ReplayConfig,
    monitoring: Option<PathBuf>,
    failed_flows: Option<PathBuf>,
}

impl SnapshotQueryService {
    /// Create service with no snapshots
    #[must_use]
    pub fn new(config: &XtmonConfig) -> Self {
        Self {
            monitoring_config: config.monitoring.clone(),
            replay_config: config.replay.clone(),
            monitoring: None,
            failed_flows: None,
        }
    }

    /// With monitoring table snapshot (`{columns, rows}`)
    #[inline]
    #[must_use]
    pub fn with_monitoring(mut self, path: impl Into<PathBuf>) -> Self {
        self.monitoring = Some(path.into());
        self
    }

    /// With failed flows snapshot (array of rows, any Pnl dates)
    #[inline]
    #[must_use]
    pub fn with_failed_flows(mut self, path: impl Into<PathBuf>) -> Self {
        self.failed_flows = Some(path.into());
        self
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        path: Option<&PathBuf>,
        procedure: &str,
        timeout_secs: u64,
    ) -> Result<T, QueryError> {
        let path = path.ok_or_else(|| {
            QueryError::Transport(format!("no snapshot configured for {procedure}"))
        })?;
        tracing::debug!("Serving {} from {}", procedure, path.display());

        let read = tokio::fs::read(path);
        let bytes = tokio::time::timeout(Duration::from_secs(timeout_secs), read)
            .await
            .map_err(|_| {
                QueryError::Transport(format!("{procedure} timed out after {timeout_secs}s"))
            })??;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl QueryService for SnapshotQueryService {
    async fn fetch_monitoring_table(&self) -> Result<TabularResult, QueryError> {
        Self::read_json(
            self.monitoring.as_ref(),
            &self.monitoring_config.procedure,
            self.monitoring_config.command_timeout_secs,
        )
        .await
    }

    async fn fetch_failed_flows(
        &self,
        pnl_date: NaiveDate,
    ) -> Result<Vec<FailedFlowRow>, QueryError> {
        let rows: Vec<FailedFlowRow> = Self::read_json(
            self.failed_flows.as_ref(),
            &self.replay_config.failed_flows_procedure,
            self.replay_config.command_timeout_secs,
        )
        .await?;
        Ok(rows.into_iter().filter(|r| r.pnl_date == pnl_date).collect())
    }

    async fn submit_replay(
        &self,
        _rows: &[ReplaySubmissionRow],
    ) -> Result<Vec<ReplayResultRow>, QueryError> {
        Err(QueryError::ReadOnly(format!(
            "snapshot of {}",
            self.replay_config.replay_procedure
        )))
    }
}
