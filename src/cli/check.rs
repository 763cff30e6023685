//! Check command implementation

use crate::broker::{AlpacaBroker, AlpacaBrokerConfig, Broker};
use crate::config::{Config, Credentials};
use crate::telemetry::{set_gauge, GaugeMetric};
use clap::Args;
use rust_decimal::prelude::ToPrimitive;

#[derive(Args, Debug)]
pub struct CheckArgs {}

impl CheckArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let credentials = Credentials::from_env()?;
        let broker = AlpacaBroker::with_config(
            AlpacaBrokerConfig {
                base_url: config.broker.trading_url.clone(),
                ..Default::default()
            },
            credentials,
        );

        let account = broker.get_account().await?;

        tracing::info!(
            status = %account.status,
            equity = %account.equity,
            cash = %account.cash,
            "Connected to broker"
        );
        set_gauge(GaugeMetric::Equity, account.equity.to_f64().unwrap_or(0.0));
        set_gauge(GaugeMetric::Cash, account.cash.to_f64().unwrap_or(0.0));

        if account.trading_blocked {
            tracing::warn!("Trading is currently blocked on this account");
        }

        Ok(())
    }
}
