//! Monitoring board
//!
//! State behind the database size/disk page: the last report, the cards
//! built from it, and the load status.

use crate::config::{MonitoringConfig, XtmonConfig};
use crate::error::QueryError;
use crate::source::QueryService;
use crate::table::{group_cards, Card, TabularResult};
use chrono::{DateTime, Utc};

/// Handle for one issued monitoring reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a reload ticket must be completed"]
pub struct MonitoringTicket {
    generation: u64,
}

/// What happened to a completed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Outcome applied to the state
    Applied,
    /// A newer request was issued meanwhile; outcome dropped
    Superseded,
}

/// Monitoring page state
#[derive(Debug, Clone)]
pub struct MonitoringBoard {
    config: MonitoringConfig,
    result: Option<TabularResult>,
    cards: Vec<Card>,
    is_loading: bool,
    load_error: Option<String>,
    last_refresh: Option<DateTime<Utc>>,
    generation: u64,
}

impl MonitoringBoard {
    /// Create an empty board
    #[must_use]
    pub fn new(config: &XtmonConfig) -> Self {
        Self {
            config: config.monitoring.clone(),
            result: None,
            cards: Vec::new(),
            is_loading: false,
            load_error: None,
            last_refresh: None,
            generation: 0,
        }
    }

    /// Fetch the report and rebuild the cards
    pub async fn reload(&mut self, service: &dyn QueryService) -> Completion {
        let ticket = self.begin_reload();
        let outcome = service.fetch_monitoring_table().await;
        self.complete_reload(ticket, outcome)
    }

    /// Mark a reload as issued
    pub fn begin_reload(&mut self) -> MonitoringTicket {
        self.generation += 1;
        self.is_loading = true;
        self.load_error = None;
        tracing::debug!(
            "Monitoring reload {} issued for {}",
            self.generation,
            self.config.procedure
        );
        MonitoringTicket {
            generation: self.generation,
        }
    }

    /// Apply the outcome of an issued reload
    ///
    /// Failures keep the previously built cards.
    pub fn complete_reload(
        &mut self,
        ticket: MonitoringTicket,
        outcome: Result<TabularResult, QueryError>,
    ) -> Completion {
        if ticket.generation != self.generation {
            tracing::debug!("Dropping superseded monitoring reload {}", ticket.generation);
            return Completion::Superseded;
        }

        self.is_loading = false;
        match outcome {
            Ok(result) => {
                self.cards = group_cards(
                    &result,
                    &self.config.key_column,
                    self.config.card_columns.as_slice(),
                );
                tracing::info!(
                    "Monitoring report loaded: {} rows, {} cards",
                    result.rows.len(),
                    self.cards.len()
                );
                self.result = Some(result);
                self.last_refresh = Some(Utc::now());
            }
            Err(e) => {
                tracing::warn!("Monitoring reload failed: {}", e);
                self.load_error = Some(e.to_string());
            }
        }
        Completion::Applied
    }

    /// Cards built from the last report
    #[inline]
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Last raw report
    #[inline]
    #[must_use]
    pub fn result(&self) -> Option<&TabularResult> {
        self.result.as_ref()
    }

    /// Procedure shown on the page
    #[inline]
    #[must_use]
    pub fn procedure_name(&self) -> &str {
        &self.config.procedure
    }

    /// Whether a reload is in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message of the last failed reload
    #[inline]
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Time of the last successful reload
    #[inline]
    #[must_use]
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }
}
