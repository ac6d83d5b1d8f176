//! Dashboard configuration
//!
//! Procedure names, timeouts and the monitoring card layout. Passed
//! explicitly to the boards and query services at startup.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column holding the database name in the size/disk report
pub const DEFAULT_KEY_COLUMN: &str = "DatabaseName";

/// Columns shown on each database card, in display order
pub const DEFAULT_CARD_COLUMNS: [&str; 9] = [
    "FileGroup",
    "AllocatedSpaceMB",
    "UsedSpaceMB",
    "FreeSpaceMB",
    "Autogrow",
    "FreeDriveMB",
    "PartSizeMB",
    "TotalFreeSpaceMB",
    "AlertLevel",
];

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XtmonConfig {
    /// Monitoring report settings
    pub monitoring: MonitoringConfig,
    /// Replay workflow settings
    pub replay: ReplayConfig,
}

impl XtmonConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML
    /// - `ConfigError::Invalid` if validation fails
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - see [`XtmonConfig::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    /// - `ConfigError::Invalid` on empty names or zero timeouts
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.monitoring;
        let r = &self.replay;
        if m.procedure.trim().is_empty()
            || r.failed_flows_procedure.trim().is_empty()
            || r.replay_procedure.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "procedure names must not be empty".to_string(),
            ));
        }
        if m.key_column.trim().is_empty() {
            return Err(ConfigError::Invalid("key_column must not be empty".to_string()));
        }
        if m.command_timeout_secs == 0 || r.command_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "command timeouts must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// With monitoring key column
    #[inline]
    #[must_use]
    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.monitoring.key_column = column.into();
        self
    }

    /// With card column whitelist
    #[inline]
    #[must_use]
    pub fn with_card_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.monitoring.card_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Database size/disk report settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Report procedure
    pub procedure: String,
    /// Command timeout in seconds
    pub command_timeout_secs: u64,
    /// Column used to group rows into cards
    pub key_column: String,
    /// Columns projected onto each card
    pub card_columns: Vec<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            procedure: "GetDbSizePlusDisk".to_string(),
            command_timeout_secs: 30,
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            card_columns: DEFAULT_CARD_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// Failed-flow replay settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Failed-flow lookup procedure
    pub failed_flows_procedure: String,
    /// Replay submission procedure
    pub replay_procedure: String,
    /// Command timeout in seconds
    pub command_timeout_secs: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            failed_flows_procedure: "administration.GetFailedFlows".to_string(),
            replay_procedure: "administration.UspReplayFlows".to_string(),
            command_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_dashboard_layout() {
        let config = XtmonConfig::new();
        assert_eq!(config.monitoring.key_column, "DatabaseName");
        assert_eq!(config.monitoring.card_columns.len(), 9);
        assert_eq!(config.monitoring.card_columns[0], "FileGroup");
        assert_eq!(config.replay.replay_procedure, "administration.UspReplayFlows");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = XtmonConfig::from_toml_str(
            r#"
            [monitoring]
            procedure = "dbo.DiskReport"

            [replay]
            command_timeout_secs = 90
            "#,
        )
        .unwrap();

        assert_eq!(config.monitoring.procedure, "dbo.DiskReport");
        assert_eq!(config.monitoring.key_column, "DatabaseName");
        assert_eq!(config.replay.command_timeout_secs, 90);
        assert_eq!(
            config.replay.failed_flows_procedure,
            "administration.GetFailedFlows"
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = XtmonConfig::from_toml_str("[monitoring]\ncommand_timeout_secs = 0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = XtmonConfig::from_toml_str("[monitoring\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn builder_overrides_layout() {
        let config = XtmonConfig::new()
            .with_key_column("Server")
            .with_card_columns(["Drive", "FreeMB"]);
        assert_eq!(config.monitoring.key_column, "Server");
        assert_eq!(config.monitoring.card_columns, vec!["Drive", "FreeMB"]);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xtmon.toml");
        std::fs::write(&path, "[monitoring]\nkey_column = \"Db\"\n").unwrap();

        let config = XtmonConfig::load(&path).unwrap();
        assert_eq!(config.monitoring.key_column, "Db");

        let missing = XtmonConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
