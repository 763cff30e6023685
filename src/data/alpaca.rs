//! Alpaca Market Data v2 client
//!
//! Fetches daily OHLCV bars from the `/v2/stocks/{symbol}/bars` endpoint,
//! following `next_page_token` pagination until the window is exhausted.

use super::{DataSourceError, MarketData};
use crate::config::Credentials;
use crate::store::Bar;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Market Data API base URL
pub const ALPACA_DATA_URL: &str = "https://data.alpaca.markets";

/// Configuration for the market data client
#[derive(Debug, Clone)]
pub struct AlpacaDataConfig {
    /// Base URL for the Market Data API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum bars per page request
    pub page_limit: u32,
}

impl Default for AlpacaDataConfig {
    fn default() -> Self {
        Self {
            base_url: ALPACA_DATA_URL.to_string(),
            timeout: Duration::from_secs(10),
            page_limit: 10_000,
        }
    }
}

/// Client for the Alpaca Market Data v2 API
pub struct AlpacaData {
    config: AlpacaDataConfig,
    credentials: Credentials,
    client: Client,
}

impl AlpacaData {
    /// Create a new client with default configuration
    pub fn new(credentials: Credentials) -> Self {
        Self::with_config(AlpacaDataConfig::default(), credentials)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: AlpacaDataConfig, credentials: Credentials) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            credentials,
            client,
        }
    }
}

#[async_trait]
impl MarketData for AlpacaData {
    async fn daily_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataSourceError> {
        let url = format!("{}/v2/stocks/{}/bars", self.config.base_url, symbol);
        let limit = self.config.page_limit.to_string();

        let mut bars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("timeframe", "1Day".to_string()),
                ("start", start.to_rfc3339()),
                ("end", end.to_rfc3339()),
                ("adjustment", "raw".to_string()),
                ("limit", limit.clone()),
            ];
            if let Some(token) = &page_token {
                query.push(("page_token", token.clone()));
            }

            tracing::debug!(url = %url, symbol, ?page_token, "Fetching daily bars");

            let response = self
                .client
                .get(&url)
                .header("APCA-API-KEY-ID", &self.credentials.key_id)
                .header("APCA-API-SECRET-KEY", &self.credentials.secret)
                .query(&query)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(DataSourceError::Api { status, body });
            }

            let page: BarsResponse = response.json().await?;
            bars.extend(page.bars.unwrap_or_default().into_iter().map(Bar::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        bars.sort_by_key(|b| b.ts);

        tracing::debug!(symbol, bar_count = bars.len(), "Fetched daily bars");

        Ok(bars)
    }
}

/// One page of the bars endpoint response
#[derive(Debug, Deserialize)]
struct BarsResponse {
    bars: Option<Vec<ApiBar>>,
    next_page_token: Option<String>,
}

/// Wire format of a single bar
#[derive(Debug, Deserialize)]
struct ApiBar {
    #[serde(rename = "t")]
    ts: DateTime<Utc>,
    #[serde(rename = "o")]
    open: Decimal,
    #[serde(rename = "h")]
    high: Decimal,
    #[serde(rename = "l")]
    low: Decimal,
    #[serde(rename = "c")]
    close: Decimal,
    #[serde(rename = "v")]
    volume: Decimal,
}

impl From<ApiBar> for Bar {
    fn from(bar: ApiBar) -> Self {
        Self {
            ts: bar.ts,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AlpacaDataConfig::default();
        assert_eq!(config.base_url, ALPACA_DATA_URL);
        assert_eq!(config.page_limit, 10_000);
    }

    #[test]
    fn test_bars_response_deserialize() {
        let json = r#"{
            "bars": [
                {"t": "2024-01-03T05:00:00Z", "o": 100.5, "h": 101.2, "l": 99.8, "c": 100.9, "v": 1234567, "n": 5000, "vw": 100.6}
            ],
            "symbol": "SPY",
            "next_page_token": "abc123"
        }"#;

        let page: BarsResponse = serde_json::from_str(json).unwrap();
        let bars = page.bars.unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, dec!(100.9));
        assert_eq!(page.next_page_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_empty_bars_response_deserialize() {
        let json = r#"{"bars": null, "symbol": "SPY", "next_page_token": null}"#;
        let page: BarsResponse = serde_json::from_str(json).unwrap();
        assert!(page.bars.is_none());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_api_bar_conversion() {
        let api_bar = ApiBar {
            ts: "2024-01-03T05:00:00Z".parse().unwrap(),
            open: dec!(100.5),
            high: dec!(101.2),
            low: dec!(99.8),
            close: dec!(100.9),
            volume: dec!(1234567),
        };

        let bar = Bar::from(api_bar);
        assert_eq!(bar.close, dec!(100.9));
        assert_eq!(bar.volume, dec!(1234567));
    }
}
