//! Bar store module
//!
//! Per-symbol daily bar history: pure merge/returns logic plus the CSV
//! persistence layer

mod csv_store;
mod returns;

pub use csv_store::CsvBarStore;
pub(crate) use csv_store::append_rows;
pub use returns::{compute_returns, Return};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// A single daily OHLCV bar, UTC timestamped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar timestamp (UTC, day granularity)
    pub ts: DateTime<Utc>,
    /// Opening price
    pub open: Decimal,
    /// Highest price
    pub high: Decimal,
    /// Lowest price
    pub low: Decimal,
    /// Closing price
    pub close: Decimal,
    /// Volume traded
    pub volume: Decimal,
}

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failure
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed or unwritable CSV content
    #[error("store csv: {0}")]
    Csv(#[from] csv::Error),
    /// Expected store file does not exist
    #[error("no store file at {path}")]
    Missing { path: PathBuf },
}

/// Merge incoming bars into an existing store.
///
/// Concatenates, dedupes by timestamp (the existing row wins; overlapping
/// fetch windows are expected to carry identical content) and sorts
/// ascending. Pure function, independent of persistence.
pub fn merge(existing: &[Bar], incoming: &[Bar]) -> Vec<Bar> {
    let mut by_ts: BTreeMap<DateTime<Utc>, Bar> = BTreeMap::new();
    for bar in existing.iter().chain(incoming) {
        by_ts.entry(bar.ts).or_insert_with(|| bar.clone());
    }
    by_ts.into_values().collect()
}

#[cfg(test)]
pub(crate) fn test_bar(day: u32, close: &str) -> Bar {
    use chrono::TimeZone;
    use std::str::FromStr;

    let c = Decimal::from_str(close).unwrap();
    Bar {
        ts: Utc.with_ymd_and_hms(2024, 1, day, 5, 0, 0).unwrap(),
        open: c,
        high: c,
        low: c,
        close: c,
        volume: Decimal::from(1000),
    }
}
