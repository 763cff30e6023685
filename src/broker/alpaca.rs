//! Alpaca Trading v2 client
//!
//! `GET /v2/account` for the account snapshot, `POST /v2/orders` for
//! notional day market orders.

use super::{Account, Broker, BrokerError, OrderAck, OrderSide};
use crate::config::Credentials;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Paper trading API base URL
pub const ALPACA_PAPER_URL: &str = "https://paper-api.alpaca.markets";

/// Configuration for the trading client
#[derive(Debug, Clone)]
pub struct AlpacaBrokerConfig {
    /// Base URL for the Trading API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for AlpacaBrokerConfig {
    fn default() -> Self {
        Self {
            base_url: ALPACA_PAPER_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the Alpaca Trading v2 API
pub struct AlpacaBroker {
    config: AlpacaBrokerConfig,
    credentials: Credentials,
    client: Client,
}

impl AlpacaBroker {
    /// Create a new client with default (paper) configuration
    pub fn new(credentials: Credentials) -> Self {
        Self::with_config(AlpacaBrokerConfig::default(), credentials)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: AlpacaBrokerConfig, credentials: Credentials) -> Self {
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

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("APCA-API-KEY-ID", &self.credentials.key_id)
            .header("APCA-API-SECRET-KEY", &self.credentials.secret)
    }
}

/// Wire format of an order submission
#[derive(Debug, Serialize)]
struct OrderRequest<'a> {
    symbol: &'a str,
    /// Notional dollar amount, serialized as a string per the API contract
    notional: String,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: &'a str,
    time_in_force: &'a str,
    client_order_id: String,
}

#[async_trait]
impl Broker for AlpacaBroker {
    async fn get_account(&self) -> Result<Account, BrokerError> {
        let url = format!("{}/v2/account", self.config.base_url);

        tracing::debug!(url = %url, "Fetching account");

        let response = self.authed(self.client.get(&url)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BrokerError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    async fn submit_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        notional_usd: Decimal,
    ) -> Result<OrderAck, BrokerError> {
        let url = format!("{}/v2/orders", self.config.base_url);

        let request = OrderRequest {
            symbol,
            notional: notional_usd.to_string(),
            side,
            order_type: "market",
            time_in_force: "day",
            client_order_id: Uuid::new_v4().to_string(),
        };

        tracing::info!(symbol, %side, %notional_usd, "Submitting market order");

        let response = self
            .authed(self.client.post(&url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BrokerError::Api { status, body });
        }

        let ack: OrderAck = response.json().await?;

        tracing::info!(symbol, order_id = %ack.id, status = %ack.status, "Order accepted");

        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_is_paper() {
        let config = AlpacaBrokerConfig::default();
        assert_eq!(config.base_url, ALPACA_PAPER_URL);
    }

    #[test]
    fn test_order_request_serialization() {
        let request = OrderRequest {
            symbol: "SPY",
            notional: dec!(5.00).to_string(),
            side: OrderSide::Buy,
            order_type: "market",
            time_in_force: "day",
            client_order_id: "test-id".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["symbol"], "SPY");
        assert_eq!(json["notional"], "5.00");
        assert_eq!(json["side"], "buy");
        assert_eq!(json["type"], "market");
        assert_eq!(json["time_in_force"], "day");
    }
}
