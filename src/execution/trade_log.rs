//! Trade log: one append-only row per attempted order

use crate::broker::OrderSide;
use crate::signal::SignalClass;
use crate::store::{append_rows, StoreError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Trade log file name under the log directory
pub const TRADE_LOG_FILE: &str = "trades.csv";

/// Outcome of a single order attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Success,
    Error,
}

/// One attempted order. Success and error cohorts share the log,
/// differentiated by `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Batch timestamp: shared by every record of one execution run
    pub ts: DateTime<Utc>,
    pub symbol: String,
    pub side: OrderSide,
    pub notional: Decimal,
    pub signal: SignalClass,
    pub forecast_return: f64,
    pub status: TradeStatus,
    pub error_detail: Option<String>,
    pub order_id: Option<String>,
}

/// Append-only trade log, one shared CSV per process
#[derive(Debug, Clone)]
pub struct TradeLog {
    path: PathBuf,
}

impl TradeLog {
    /// Create a log writing to `{log_dir}/trades.csv`
    pub fn new(log_dir: impl AsRef<Path>) -> Self {
        Self {
            path: log_dir.as_ref().join(TRADE_LOG_FILE),
        }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a batch of records; a no-op for an empty batch
    pub fn append_all<'a>(
        &self,
        records: impl IntoIterator<Item = &'a TradeRecord>,
    ) -> Result<(), StoreError> {
        append_rows(&self.path, records)
    }
}
