//! Prometheus metrics

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Bars fetched from the data source
    BarsFetched,
    /// Per-symbol sync failures
    SyncErrors,
    /// Orders accepted by the broker
    OrdersSubmitted,
    /// Orders rejected or failed
    OrderErrors,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Current account equity
    Equity,
    /// Current account cash
    Cash,
    /// Signals produced in the latest run
    SignalCount,
}

/// Increment a counter
pub fn increment(metric: CounterMetric, value: u64) {
    let metric_name = match metric {
        CounterMetric::BarsFetched => "alpaca_daily_bars_fetched_total",
        CounterMetric::SyncErrors => "alpaca_daily_sync_errors_total",
        CounterMetric::OrdersSubmitted => "alpaca_daily_orders_submitted_total",
        CounterMetric::OrderErrors => "alpaca_daily_order_errors_total",
    };

    metrics::counter!(metric_name).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::Equity => "alpaca_daily_equity_usd",
        GaugeMetric::Cash => "alpaca_daily_cash_usd",
        GaugeMetric::SignalCount => "alpaca_daily_signal_count",
    };

    metrics::gauge!(metric_name).set(value);
}
