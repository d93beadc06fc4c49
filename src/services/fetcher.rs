//! Background market fetcher
//!
//! Runs one listing fetch at a time on a worker thread and hands the result
//! back through a channel that the UI polls on every tick.

use super::market::{self, FetchError, MarketSource};
use crate::model::{CoinRecord, FetchOutcome};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// A fetch running on a worker thread
struct FetchJob {
    receiver: Receiver<Result<Vec<CoinRecord>, FetchError>>,
    started: Instant,
}

/// Fetcher service for listing refreshes
#[derive(Default)]
pub struct MarketFetcher {
    job: Option<FetchJob>,
}

impl MarketFetcher {
    pub fn new() -> Self {
        Self { job: None }
    }

    pub fn is_running(&self) -> bool {
        self.job.is_some()
    }

    /// Time since the current fetch started
    pub fn elapsed(&self) -> Option<Duration> {
        self.job.as_ref().map(|j| j.started.elapsed())
    }

    /// Start fetching from the source. A fetch already in flight is
    /// abandoned and its result dropped.
    pub fn spawn(&mut self, source: MarketSource) {
        tracing::info!(source = %source.describe(), "Fetching market listing");
        self.spawn_with(move || market::fetch(&source));
    }

    /// Run an arbitrary fetch on the worker thread
    pub fn spawn_with<F>(&mut self, fetch: F)
    where
        F: FnOnce() -> Result<Vec<CoinRecord>, FetchError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            // The receiver is gone when the fetch was superseded
            let _ = tx.send(fetch());
        });

        self.job = Some(FetchJob {
            receiver: rx,
            started: Instant::now(),
        });
    }

    /// Poll for a finished fetch
    pub fn poll(&mut self) -> Option<FetchOutcome> {
        let job = self.job.as_ref()?;

        let outcome = match job.receiver.try_recv() {
            Ok(Ok(rows)) => {
                tracing::info!(
                    rows = rows.len(),
                    elapsed_ms = job.started.elapsed().as_millis() as u64,
                    "Market listing loaded"
                );
                FetchOutcome::Loaded(rows)
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, "Market listing fetch failed");
                FetchOutcome::Failed(err.to_string())
            }
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                tracing::error!("Market fetch worker exited without a result");
                FetchOutcome::Failed("fetch worker stopped unexpectedly".to_string())
            }
        };

        self.job = None;
        Some(outcome)
    }
}
