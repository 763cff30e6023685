//! Broker module
//!
//! Account state and market order submission via the Alpaca Trading v2 API

mod alpaca;

pub use alpaca::{AlpacaBroker, AlpacaBrokerConfig, ALPACA_PAPER_URL};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broker errors
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Transport-level failure (connect, TLS, timeout)
    #[error("broker transport: {0}")]
    Http(#[from] reqwest::Error),
    /// Rejection or auth failure from the API
    #[error("broker api error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Trading account snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    /// Account status reported by the broker (e.g. "ACTIVE")
    pub status: String,
    /// Total account equity in USD
    pub equity: Decimal,
    /// Available cash in USD
    pub cash: Decimal,
    /// Whether order submission is currently blocked
    pub trading_blocked: bool,
}

/// Acknowledgement for a submitted order
#[derive(Debug, Clone, Deserialize)]
pub struct OrderAck {
    /// Broker-assigned order identifier
    pub id: String,
    /// Order status at acceptance (e.g. "accepted", "filled")
    pub status: String,
}

/// Trait for broker implementations
#[async_trait]
pub trait Broker: Send + Sync {
    /// Fetch the current account snapshot
    async fn get_account(&self) -> Result<Account, BrokerError>;

    /// Submit a notional market order, one attempt, no retry
    async fn submit_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        notional_usd: Decimal,
    ) -> Result<OrderAck, BrokerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_side_display() {
        assert_eq!(OrderSide::Buy.to_string(), "buy");
        assert_eq!(OrderSide::Sell.to_string(), "sell");
    }

    #[test]
    fn test_account_deserialize_string_numbers() {
        // Alpaca serializes money fields as JSON strings
        let json = r#"{
            "status": "ACTIVE",
            "equity": "100234.56",
            "cash": "5000.10",
            "trading_blocked": false
        }"#;

        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.status, "ACTIVE");
        assert_eq!(account.equity, dec!(100234.56));
        assert_eq!(account.cash, dec!(5000.10));
        assert!(!account.trading_blocked);
    }

    #[test]
    fn test_order_ack_deserialize() {
        let json = r#"{"id": "904837e3-3b76-47ec-b432-046db621571b", "status": "accepted"}"#;
        let ack: OrderAck = serde_json::from_str(json).unwrap();
        assert_eq!(ack.id, "904837e3-3b76-47ec-b432-046db621571b");
        assert_eq!(ack.status, "accepted");
    }
}
