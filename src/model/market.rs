//! Market state - the row snapshot the table engine renders
//!
//! Holds the last successfully fetched rows. A failed refresh keeps the
//! previous snapshot on screen and records the error for the status bar.

use super::coin::CoinRecord;
use chrono::{DateTime, Local};

/// Result of one background fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded(Vec<CoinRecord>),
    Failed(String),
}

/// Current market snapshot and its fetch status
#[derive(Debug, Default)]
pub struct MarketState {
    /// Rows of the last successful fetch
    pub rows: Vec<CoinRecord>,
    /// Whether a fetch is in flight
    pub loading: bool,
    /// Error of the last fetch, if it failed
    pub error: Option<String>,
    /// When the rows were last replaced
    pub last_updated: Option<DateTime<Local>>,
}

impl MarketState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a fetch as started
    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Apply a fetch outcome, returning true when the rows were replaced
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        self.loading = false;
        match outcome {
            FetchOutcome::Loaded(rows) => {
                self.rows = rows;
                self.error = None;
                self.last_updated = Some(Local::now());
                true
            }
            FetchOutcome::Failed(err) => {
                self.error = Some(err);
                false
            }
        }
    }

    /// Skeleton rows are only shown before the first snapshot arrives
    pub fn show_placeholders(&self) -> bool {
        self.loading && self.rows.is_empty()
    }

    pub fn formatted_update_time(&self) -> Option<String> {
        self.last_updated
            .map(|t| t.format("%H:%M:%S").to_string())
    }
}
