//! Run command implementation
//!
//! Pipeline: sync the portfolio (skippable), build signals, print them,
//! then optionally place paper trades behind an explicit flag.

use crate::broker::{AlpacaBroker, AlpacaBrokerConfig};
use crate::config::{Config, Credentials};
use crate::data::{AlpacaData, AlpacaDataConfig};
use crate::execution::{derive_intents, OrderEngine, TradeLog};
use crate::model::Ar1Forecaster;
use crate::signal::{Signal, SignalEngine};
use crate::store::CsvBarStore;
use crate::sync::{AuditLog, SyncEngine};
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Portfolio to process (defaults to the configured default)
    #[arg(short, long)]
    pub portfolio: Option<String>,

    /// Actually place paper trades based on signals
    #[arg(long)]
    pub allow_trade: bool,

    /// Skip the data sync stage and use existing stores
    #[arg(long)]
    pub no_sync: bool,

    /// Exit after the data sync stage
    #[arg(long)]
    pub sync_only: bool,

    /// USD notional per trade (overrides the configured default)
    #[arg(long)]
    pub notional: Option<Decimal>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let portfolio_name = self
            .portfolio
            .as_deref()
            .unwrap_or(&config.strategy.default_portfolio);
        let symbols: Vec<String> = config
            .portfolio(portfolio_name)
            .ok_or_else(|| anyhow::anyhow!("unknown portfolio '{portfolio_name}'"))?
            .to_vec();

        let store = CsvBarStore::new(&config.data.data_dir);

        if self.no_sync {
            tracing::info!("Skipping data sync, using existing stores");
        } else {
            tracing::info!(portfolio = portfolio_name, "Updating market data");

            let data = AlpacaData::with_config(
                AlpacaDataConfig {
                    base_url: config.broker.data_url.clone(),
                    ..Default::default()
                },
                Credentials::from_env()?,
            );
            let sync_engine = SyncEngine::new(
                data,
                store.clone(),
                AuditLog::new(&config.data.log_dir),
                config.data.lookback_days_if_missing,
                config.data.end_buffer_days,
            );

            let report = sync_engine.sync_portfolio(&symbols).await;
            if !report.all_ok() {
                let failed: Vec<_> = report.failed().map(|o| o.symbol.as_str()).collect();
                tracing::warn!(?failed, "Some symbols failed to sync");
            }
        }

        if self.sync_only {
            tracing::info!("Sync-only mode, exiting after data update");
            return Ok(());
        }

        tracing::info!(portfolio = portfolio_name, "Building signals");
        let signal_engine = SignalEngine::new(
            Ar1Forecaster::new(config.strategy.min_observations),
            config.strategy.up_threshold,
            config.strategy.down_threshold,
        );
        let signals = signal_engine.build_signals(&symbols, &store)?;

        print_signals(&signals);

        if !self.allow_trade {
            tracing::info!("Dry run: not placing trades (pass --allow-trade to enable)");
            return Ok(());
        }

        // Zero or negative override falls back to the configured default
        let notional = match self.notional {
            Some(n) if n > Decimal::ZERO => n,
            _ => config.trading.notional_usd,
        };

        let plan = derive_intents(&signals, notional, config.trading.allow_short);
        if plan.intents.is_empty() {
            tracing::info!("No trades to place (no actionable signals)");
            return Ok(());
        }

        tracing::info!(orders = plan.intents.len(), %notional, "Placing paper trades");
        let broker = AlpacaBroker::with_config(
            AlpacaBrokerConfig {
                base_url: config.broker.trading_url.clone(),
                ..Default::default()
            },
            Credentials::from_env()?,
        );
        let order_engine = OrderEngine::new(broker, TradeLog::new(&config.data.log_dir));
        let report = order_engine.execute(&plan.intents).await?;

        tracing::info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Done"
        );

        Ok(())
    }
}

fn print_signals(signals: &[Signal]) {
    println!("=== Signals ===");
    println!(
        "{:<8} {:>14} {:>7} {:>8}",
        "symbol", "forecast", "signal", "samples"
    );
    for signal in signals {
        let note = if signal.unavailable.is_some() {
            "  (forecast unavailable)"
        } else {
            ""
        };
        println!(
            "{:<8} {:>14.8} {:>7} {:>8}{}",
            signal.symbol, signal.forecast_return, signal.classification, signal.sample_size, note
        );
    }
}
