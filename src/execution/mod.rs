//! Order engine module
//!
//! Turns signals into notional market orders, submits them through the
//! broker, and partitions outcomes into success/error cohorts.

mod trade_log;

pub use trade_log::{TradeLog, TradeRecord, TradeStatus, TRADE_LOG_FILE};

use crate::broker::{Broker, BrokerError, OrderSide};
use crate::signal::{Signal, SignalClass};
use crate::store::StoreError;
use crate::telemetry::{increment, CounterMetric};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Execution-stage errors. Per-order broker failures are not here: they
/// are captured in the report's error cohort instead.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The account is blocked; the whole batch is aborted before any
    /// submission and no trade log rows are written
    #[error("trading is blocked on this account")]
    TradingBlocked,
    /// The pre-submission account check failed
    #[error(transparent)]
    Broker(#[from] BrokerError),
    /// The trade log could not be appended
    #[error("trade log append: {0}")]
    TradeLog(#[from] StoreError),
}

/// A concrete order derived from a signal
#[derive(Debug, Clone)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub notional_usd: Decimal,
    pub signal: SignalClass,
    pub forecast_return: f64,
}

/// Intents derived from a signal batch, with skipped shorts kept visible
#[derive(Debug, Default)]
pub struct IntentPlan {
    pub intents: Vec<OrderIntent>,
    /// Short signals dropped by policy (`allow_short = false`)
    pub skipped_shorts: Vec<Signal>,
}

/// Map signals to order intents.
///
/// Long signals buy the configured notional. Short signals sell only when
/// `allow_short` is set; the default market rejects fractional-notional
/// shorts, so they are recorded as skipped instead. Flat signals produce
/// nothing.
pub fn derive_intents(signals: &[Signal], notional_usd: Decimal, allow_short: bool) -> IntentPlan {
    let mut plan = IntentPlan::default();

    for signal in signals {
        let side = match signal.classification {
            SignalClass::Flat => continue,
            SignalClass::Long => OrderSide::Buy,
            SignalClass::Short if allow_short => OrderSide::Sell,
            SignalClass::Short => {
                tracing::info!(
                    symbol = %signal.symbol,
                    forecast_return = signal.forecast_return,
                    "Skipping short signal, shorting disabled"
                );
                plan.skipped_shorts.push(signal.clone());
                continue;
            }
        };

        plan.intents.push(OrderIntent {
            symbol: signal.symbol.clone(),
            side,
            notional_usd,
            signal: signal.classification,
            forecast_return: signal.forecast_return,
        });
    }

    plan
}

/// Result of one execution batch
#[derive(Debug)]
pub struct ExecutionReport {
    /// Timestamp shared by every trade log row of this batch
    pub batch_ts: DateTime<Utc>,
    pub succeeded: Vec<TradeRecord>,
    pub failed: Vec<TradeRecord>,
}

impl ExecutionReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Submits order intents through a broker and records every attempt
pub struct OrderEngine<B: Broker> {
    broker: B,
    trade_log: TradeLog,
}

impl<B: Broker> OrderEngine<B> {
    pub fn new(broker: B, trade_log: TradeLog) -> Self {
        Self { broker, trade_log }
    }

    /// Execute a batch of intents, one submission attempt each.
    ///
    /// The account is checked once up front; a blocked account aborts the
    /// batch with zero submissions. Individual broker failures land in
    /// the error cohort and do not stop the remaining intents. One trade
    /// log row is appended per intent after the batch completes.
    pub async fn execute(&self, intents: &[OrderIntent]) -> Result<ExecutionReport, ExecutionError> {
        let account = self.broker.get_account().await?;
        if account.trading_blocked {
            return Err(ExecutionError::TradingBlocked);
        }

        let batch_ts = Utc::now();
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        for intent in intents {
            tracing::info!(
                symbol = %intent.symbol,
                side = %intent.side,
                notional = %intent.notional_usd,
                forecast_return = intent.forecast_return,
                "Placing order"
            );

            match self
                .broker
                .submit_market_order(&intent.symbol, intent.side, intent.notional_usd)
                .await
            {
                Ok(ack) => {
                    increment(CounterMetric::OrdersSubmitted, 1);
                    succeeded.push(record(batch_ts, intent, TradeStatus::Success, None, Some(ack.id)));
                }
                Err(e) => {
                    tracing::warn!(symbol = %intent.symbol, error = %e, "Order failed");
                    increment(CounterMetric::OrderErrors, 1);
                    failed.push(record(batch_ts, intent, TradeStatus::Error, Some(e.to_string()), None));
                }
            }
        }

        self.trade_log
            .append_all(succeeded.iter().chain(failed.iter()))?;

        tracing::info!(
            succeeded = succeeded.len(),
            failed = failed.len(),
            "Execution batch complete"
        );

        Ok(ExecutionReport {
            batch_ts,
            succeeded,
            failed,
        })
    }
}

fn record(
    ts: DateTime<Utc>,
    intent: &OrderIntent,
    status: TradeStatus,
    error_detail: Option<String>,
    order_id: Option<String>,
) -> TradeRecord {
    TradeRecord {
        ts,
        symbol: intent.symbol.clone(),
        side: intent.side,
        notional: intent.notional_usd,
        signal: intent.signal,
        forecast_return: intent.forecast_return,
        status,
        error_detail,
        order_id,
    }
}
