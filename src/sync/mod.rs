//! Sync engine module
//!
//! Incremental daily-bar synchronization: window computation from the
//! store tail, fetch, merge, full-rewrite persist, returns recomputation,
//! one audit row per symbol per attempt.

mod audit;

pub use audit::{AuditLog, AuditRecord, AuditStatus, AUDIT_LOG_FILE};

use crate::data::{DataSourceError, MarketData};
use crate::store::{self, CsvBarStore, StoreError};
use crate::telemetry::{increment, CounterMetric};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Per-symbol sync errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of one successful symbol sync
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub symbol: String,
    pub had_existing_store: bool,
    pub last_ts_before: Option<DateTime<Utc>>,
    pub requested_start: DateTime<Utc>,
    pub requested_end: DateTime<Utc>,
    pub rows_fetched: usize,
    pub rows_after_merge: usize,
    pub rows_added: usize,
}

/// One symbol's slot in a portfolio sync
#[derive(Debug)]
pub struct SyncOutcome {
    pub symbol: String,
    pub result: Result<SyncResult, SyncError>,
}

/// Structured result of a portfolio-wide sync. A failing symbol never
/// aborts the batch; the orchestrator decides how to surface failures.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// Compute the fetch window for a symbol.
///
/// With no stored history the window reaches back `lookback_days`;
/// otherwise it starts the day after the stored tail. The end extends
/// `end_buffer_days` past `now` because the source can report bars
/// slightly ahead of the caller's clock across timezone and
/// market-calendar boundaries.
pub fn fetch_window(
    last_ts: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    lookback_days: i64,
    end_buffer_days: i64,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = match last_ts {
        Some(ts) => ts + Duration::days(1),
        None => now - Duration::days(lookback_days),
    };
    (start, now + Duration::days(end_buffer_days))
}

/// Incremental sync engine over a market data source and a bar store
pub struct SyncEngine<D: MarketData> {
    data: D,
    store: CsvBarStore,
    audit: AuditLog,
    lookback_days_if_missing: i64,
    end_buffer_days: i64,
}

impl<D: MarketData> SyncEngine<D> {
    pub fn new(
        data: D,
        store: CsvBarStore,
        audit: AuditLog,
        lookback_days_if_missing: i64,
        end_buffer_days: i64,
    ) -> Self {
        Self {
            data,
            store,
            audit,
            lookback_days_if_missing,
            end_buffer_days,
        }
    }

    /// Sync one symbol and append exactly one audit row, whether or not
    /// the attempt succeeded.
    pub async fn sync_symbol(&self, symbol: &str) -> Result<SyncResult, SyncError> {
        let run_ts = Utc::now();
        let mut record = AuditRecord::started(run_ts, symbol);

        let result = self.sync_inner(symbol, &mut record).await;

        match &result {
            Ok(sync) => {
                record.status = AuditStatus::Success;
                record.message =
                    format!("added={}, saved_total={}", sync.rows_added, sync.rows_after_merge);
            }
            Err(e) => {
                record.status = AuditStatus::Error;
                record.message = e.to_string();
                increment(CounterMetric::SyncErrors, 1);
            }
        }

        // The audit trail is diagnostic; a failed append must not turn a
        // good sync into a failed one.
        if let Err(audit_err) = self.audit.append(&record) {
            tracing::error!(symbol, error = %audit_err, "Failed to append audit record");
        }

        result
    }

    async fn sync_inner(
        &self,
        symbol: &str,
        record: &mut AuditRecord,
    ) -> Result<SyncResult, SyncError> {
        let had_existing_store = self.store.has_bars(symbol);
        record.had_existing_store = had_existing_store;

        let existing = if had_existing_store {
            self.store.load_bars(symbol)?
        } else {
            Vec::new()
        };
        let last_ts_before = existing.iter().map(|b| b.ts).max();
        record.last_ts_before = last_ts_before;

        let (start, end) = fetch_window(
            last_ts_before,
            Utc::now(),
            self.lookback_days_if_missing,
            self.end_buffer_days,
        );
        record.requested_start = Some(start);
        record.requested_end = Some(end);

        let fetched = self.data.daily_bars(symbol, start, end).await?;
        record.rows_fetched = fetched.len();
        increment(CounterMetric::BarsFetched, fetched.len() as u64);

        let merged = store::merge(&existing, &fetched);
        record.rows_after_merge = merged.len();
        let rows_added = merged.len().saturating_sub(existing.len());

        // Full rewrite: consistent on disk even after a partial prior write
        self.store.save_bars(symbol, &merged)?;

        let returns = store::compute_returns(&merged);
        self.store.save_returns(symbol, &returns)?;

        Ok(SyncResult {
            symbol: symbol.to_string(),
            had_existing_store,
            last_ts_before,
            requested_start: start,
            requested_end: end,
            rows_fetched: fetched.len(),
            rows_after_merge: merged.len(),
            rows_added,
        })
    }

    /// Sync every symbol in the portfolio, in list order, one at a time.
    pub async fn sync_portfolio(&self, symbols: &[String]) -> SyncReport {
        let mut outcomes = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            match self.sync_symbol(symbol).await {
                Ok(result) => {
                    tracing::info!(
                        %symbol,
                        rows_fetched = result.rows_fetched,
                        rows_added = result.rows_added,
                        total = result.rows_after_merge,
                        "Sync complete"
                    );
                    outcomes.push(SyncOutcome {
                        symbol: symbol.clone(),
                        result: Ok(result),
                    });
                }
                Err(e) => {
                    tracing::warn!(%symbol, error = %e, "Sync failed, continuing with next symbol");
                    outcomes.push(SyncOutcome {
                        symbol: symbol.clone(),
                        result: Err(e),
                    });
                }
            }
        }

        SyncReport { outcomes }
    }
}
