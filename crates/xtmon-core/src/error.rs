//! Error types for XTMon Core
//!
//! Provides error handling for:
//! - Inline validation failures (bad dates, empty selection, missing ids)
//! - Query service (transport) failures
//! - Grid state violations (busy, unknown rows)
//! - Malformed tabular results
//! - Configuration loading

use crate::replay::RowKey;

/// Main XTMon error type
#[derive(Debug, thiserror::Error)]
pub enum XtmonError {
    /// User input rejected before any external call
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// External query service failed
    #[error("query failed: {0}")]
    Query(#[from] QueryError),

    /// Replay grid rejected an operation
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// Tabular result is malformed
    #[error("table error: {0}")]
    Table(#[from] TableError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl XtmonError {
    /// Check if error was raised by input validation
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Grid(GridError::Validation(_))
        )
    }

    /// Check if the user may simply re-trigger the operation
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Query(e) | Self::Grid(GridError::Transport(e)) => e.is_retryable(),
            Self::Grid(GridError::Busy { .. }) => true,
            _ => false,
        }
    }
}

/// Input validation errors
///
/// The display text is the message shown next to the triggering control.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Pnl date text did not match any accepted layout
    #[error("Enter a valid date (DD-MM-YYYY)")]
    InvalidPnlDate,

    /// Submit attempted before a successful load
    #[error("Load data first by entering a Pnl date and pressing Enter.")]
    NotLoaded,

    /// Submit attempted with nothing selected
    #[error("Select at least one row to submit.")]
    EmptySelection,

    /// Some selected rows lack flow identifiers
    #[error("Selected rows must have FlowId and FlowIdDerivedFrom values.")]
    MissingFlowIds {
        /// Number of offending rows
        count: usize,
    },
}

/// Query service errors
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Transport-level failure (connection, timeout, protocol)
    #[error("{0}")]
    Transport(String),

    /// Stored procedure reported an error
    #[error("{procedure}: {message}")]
    Query {
        /// Procedure that failed
        procedure: String,
        /// Message returned by the server
        message: String,
    },

    /// Result set lacks required columns
    #[error("Replay flows result is missing column(s): {}.", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The service cannot accept writes
    #[error("{0} is read-only")]
    ReadOnly(String),

    /// I/O failure reading a snapshot
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot payload could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    /// Check if re-triggering the call may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Query { .. } | Self::Io(_))
    }
}

/// Replay grid errors
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Inline validation failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another operation is still in flight
    #[error("{operation} is not available while the grid is busy")]
    Busy {
        /// Operation that was refused
        operation: &'static str,
    },

    /// No row with this key in the working set
    #[error("row {0} not found")]
    RowNotFound(RowKey),

    /// Flag edits require the row to be selected
    #[error("row {0} must be selected before editing")]
    RowNotSelected(RowKey),

    /// External call failed
    #[error(transparent)]
    Transport(#[from] QueryError),
}

/// Tabular result errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Row length differs from the column count
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        /// Row index
        row: usize,
        /// Column count
        expected: usize,
        /// Cells in the row
        actual: usize,
    },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config values are inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
