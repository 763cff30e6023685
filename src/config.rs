//! Configuration types for alpaca-daily

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable holding the API key id
pub const KEY_ID_ENV: &str = "ALPACA_API_KEY_ID";
/// Environment variable holding the API secret
pub const SECRET_ENV: &str = "ALPACA_API_SECRET_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub broker: BrokerConfig,
    pub data: DataConfig,
    pub strategy: StrategyConfig,
    pub trading: TradingConfig,
    pub telemetry: TelemetryConfig,
    /// Named portfolios: ordered symbol lists processed together
    pub portfolios: HashMap<String, Vec<String>>,
}

/// Broker endpoint configuration (credentials come from the environment)
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_trading_url")]
    pub trading_url: String,
    #[serde(default = "default_data_url")]
    pub data_url: String,
}

fn default_trading_url() -> String {
    crate::broker::ALPACA_PAPER_URL.to_string()
}
fn default_data_url() -> String {
    crate::data::ALPACA_DATA_URL.to_string()
}

/// Bar store and sync window configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Directory holding per-symbol bar and returns CSVs
    pub data_dir: PathBuf,
    /// Directory holding the audit and trade logs
    pub log_dir: PathBuf,
    /// History fetched on first sync of a symbol (~10 years)
    #[serde(default = "default_lookback_days")]
    pub lookback_days_if_missing: i64,
    /// Window-end extension to absorb timezone/market-calendar skew
    #[serde(default = "default_end_buffer_days")]
    pub end_buffer_days: i64,
}

fn default_lookback_days() -> i64 {
    3650
}
fn default_end_buffer_days() -> i64 {
    3
}

/// Signal thresholds and forecast policy
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// Forecast above this classifies long
    #[serde(default = "default_up_threshold")]
    pub up_threshold: f64,
    /// Forecast below this classifies short
    #[serde(default = "default_down_threshold")]
    pub down_threshold: f64,
    /// Minimum return observations before the forecaster will run
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
    /// Portfolio used when none is named on the command line
    pub default_portfolio: String,
}

fn default_up_threshold() -> f64 {
    0.0008
}
fn default_down_threshold() -> f64 {
    -0.0008
}
fn default_min_observations() -> usize {
    100
}

/// Order sizing and policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// USD notional per order
    #[serde(default = "default_notional")]
    pub notional_usd: Decimal,
    /// Whether short signals may become sell orders. Off by default:
    /// fractional-notional shorts are rejected by the target market.
    #[serde(default)]
    pub allow_short: bool,
}

fn default_notional() -> Decimal {
    Decimal::ONE
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Prometheus exporter port; disabled when unset
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// API credentials, sourced from the environment
#[derive(Debug, Clone)]
pub struct Credentials {
    pub key_id: String,
    pub secret: String,
}

impl Credentials {
    /// Read credentials from `ALPACA_API_KEY_ID` / `ALPACA_API_SECRET_KEY`
    pub fn from_env() -> anyhow::Result<Self> {
        let key_id = std::env::var(KEY_ID_ENV)
            .map_err(|_| anyhow::anyhow!("environment variable {KEY_ID_ENV} is not set"))?;
        let secret = std::env::var(SECRET_ENV)
            .map_err(|_| anyhow::anyhow!("environment variable {SECRET_ENV} is not set"))?;
        Ok(Self { key_id, secret })
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Symbols of a named portfolio
    pub fn portfolio(&self, name: &str) -> Option<&[String]> {
        self.portfolios.get(name).map(|s| s.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const EXAMPLE: &str = r#"
        [broker]
        trading_url = "https://paper-api.alpaca.markets"
        data_url = "https://data.alpaca.markets"

        [data]
        data_dir = "./data"
        log_dir = "./logs"
        lookback_days_if_missing = 3650
        end_buffer_days = 3

        [strategy]
        up_threshold = 0.0008
        down_threshold = -0.0008
        min_observations = 100
        default_portfolio = "tier1"

        [trading]
        notional_usd = 1.0
        allow_short = false

        [telemetry]
        log_level = "info"

        [portfolios]
        tier1 = ["DIA", "SPY", "XLF", "QQQ", "PG"]
        etf = ["SPY", "QQQ", "IWM", "DIA"]
    "#;

    #[test]
    fn test_config_deserialize() {
        let config: Config = toml::from_str(EXAMPLE).unwrap();
        assert_eq!(config.strategy.up_threshold, 0.0008);
        assert_eq!(config.trading.notional_usd, dec!(1.0));
        assert!(!config.trading.allow_short);
        assert_eq!(config.telemetry.metrics_port, None);
        assert_eq!(config.portfolio("tier1").unwrap().len(), 5);
    }

    #[test]
    fn test_config_defaults() {
        let toml = r#"
            [broker]

            [data]
            data_dir = "./data"
            log_dir = "./logs"

            [strategy]
            default_portfolio = "tier1"

            [trading]

            [telemetry]

            [portfolios]
            tier1 = ["SPY"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.data.lookback_days_if_missing, 3650);
        assert_eq!(config.data.end_buffer_days, 3);
        assert_eq!(config.strategy.min_observations, 100);
        assert_eq!(config.strategy.down_threshold, -0.0008);
        assert_eq!(config.trading.notional_usd, Decimal::ONE);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.broker.trading_url, crate::broker::ALPACA_PAPER_URL);
    }

    #[test]
    fn test_unknown_portfolio_is_none() {
        let config: Config = toml::from_str(EXAMPLE).unwrap();
        assert!(config.portfolio("megacaps").is_none());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }
}
