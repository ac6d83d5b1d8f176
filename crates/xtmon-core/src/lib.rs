//! XTMon Core - dashboard state for XTMon
//!
//! Two pages live here, framework-free:
//! - The monitoring board: a database size/disk report grouped into one
//!   card per database, projected onto a column whitelist
//! - The replay grid: failed flows for a Pnl date, selected, filtered,
//!   flag-edited, and submitted for replay as one batch
//!
//! All data access goes through the [`QueryService`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use xtmon_core::{ReplaySelectionGrid, SnapshotQueryService, XtmonConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = XtmonConfig::new();
//! let service = SnapshotQueryService::new(&config).with_failed_flows("flows.json");
//! let mut grid = ReplaySelectionGrid::new();
//!
//! grid.set_pnl_date_input("2024-01-05");
//! grid.reload(&service).await?;
//! grid.select_all()?;
//!
//! println!("{} of {} rows selected", grid.selected_count(), grid.total_rows());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod flows;
pub mod format;
pub mod monitoring;
pub mod pnl_date;
pub mod replay;
pub mod source;
pub mod table;

// Re-exports for convenience
pub use config::{MonitoringConfig, ReplayConfig, XtmonConfig};
pub use error::{ConfigError, GridError, QueryError, TableError, ValidationError, XtmonError};
pub use flows::{check_result_columns, FailedFlowRow, ReplayResultRow, ReplaySubmissionRow};
pub use format::{format_cell_value, to_header_label, AlertLevel};
pub use monitoring::{Completion, MonitoringBoard, MonitoringTicket};
pub use pnl_date::normalize_date;
pub use replay::{
    GridPhase, GridRow, ReloadTicket, ReplaySelectionGrid, RowKey, StatusMessage, SubmitTicket,
};
pub use source::{QueryService, SnapshotQueryService};
pub use table::{group_cards, Card, TabularResult};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with XTMon Core
    pub use crate::{
        group_cards, normalize_date, Card, Completion, FailedFlowRow, GridError, MonitoringBoard,
        QueryService, ReplaySelectionGrid, TabularResult, XtmonConfig,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
