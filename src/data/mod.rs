//! Market data module
//!
//! Daily bar history from the Alpaca Market Data v2 API

mod alpaca;

pub use alpaca::{AlpacaData, AlpacaDataConfig, ALPACA_DATA_URL};

use crate::store::Bar;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Market data source errors
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// Transport-level failure (connect, TLS, timeout)
    #[error("data source transport: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success response from the API
    #[error("data source api error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Trait for daily bar providers
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch daily bars for a symbol over `[start, end]`, UTC.
    ///
    /// May return an empty sequence when the window contains no sessions.
    async fn daily_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataSourceError>;
}
