//! Signal generation over a portfolio

use super::{classify, Signal, SignalError};
use crate::model::{Forecast, Forecaster};
use crate::store::CsvBarStore;
use crate::telemetry::{set_gauge, GaugeMetric};

/// Builds per-symbol signals from persisted returns views
pub struct SignalEngine<F: Forecaster> {
    forecaster: F,
    up_threshold: f64,
    down_threshold: f64,
}

impl<F: Forecaster> SignalEngine<F> {
    pub fn new(forecaster: F, up_threshold: f64, down_threshold: f64) -> Self {
        Self {
            forecaster,
            up_threshold,
            down_threshold,
        }
    }

    /// Build one signal per symbol, in portfolio order.
    ///
    /// Assumes the sync stage has already produced a returns view for
    /// every symbol: a missing or unusable view aborts the whole stage
    /// rather than silently emitting a zero forecast.
    pub fn build_signals(
        &self,
        symbols: &[String],
        store: &CsvBarStore,
    ) -> Result<Vec<Signal>, SignalError> {
        let mut signals = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let returns =
                store
                    .load_returns(symbol)
                    .map_err(|source| SignalError::MissingReturns {
                        symbol: symbol.clone(),
                        source,
                    })?;

            let series: Vec<f64> = returns
                .iter()
                .map(|r| r.pct_return)
                .filter(|r| r.is_finite())
                .collect();

            if series.is_empty() {
                return Err(SignalError::EmptyReturns {
                    symbol: symbol.clone(),
                });
            }

            let forecast = self.forecaster.forecast_next_return(&series);
            let forecast_return = forecast.value_or_zero();
            let classification = classify(forecast_return, self.up_threshold, self.down_threshold);

            if let Forecast::Unavailable(reason) = &forecast {
                tracing::warn!(%symbol, %reason, "Forecast unavailable, treating as zero");
            }

            tracing::debug!(
                %symbol,
                forecast_return,
                %classification,
                sample_size = series.len(),
                "Signal built"
            );

            signals.push(Signal {
                symbol: symbol.clone(),
                forecast_return,
                classification,
                sample_size: series.len(),
                unavailable: match forecast {
                    Forecast::Unavailable(reason) => Some(reason),
                    Forecast::Value(_) => None,
                },
            });
        }

        set_gauge(GaugeMetric::SignalCount, signals.len() as f64);

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Forecast, UnavailableReason};
    use crate::signal::SignalClass;
    use crate::store::{compute_returns, test_bar};
    use tempfile::tempdir;

    /// Forecaster returning a fixed value regardless of input
    struct FixedForecaster(Forecast);

    impl Forecaster for FixedForecaster {
        fn forecast_next_return(&self, _returns: &[f64]) -> Forecast {
            self.0.clone()
        }
    }

    fn seeded_store(dir: &std::path::Path, symbol: &str, days: u32) -> CsvBarStore {
        let store = CsvBarStore::new(dir);
        let bars: Vec<_> = (1..=days).map(|d| test_bar(d, "100")).collect();
        store.save_bars(symbol, &bars).unwrap();
        store
            .save_returns(symbol, &compute_returns(&bars))
            .unwrap();
        store
    }

    #[test]
    fn test_build_signals_classifies_and_counts() {
        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path(), "SPY", 10);
        let engine = SignalEngine::new(
            FixedForecaster(Forecast::Value(0.0009)),
            0.0008,
            -0.0008,
        );

        let signals = engine
            .build_signals(&["SPY".to_string()], &store)
            .unwrap();

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].classification, SignalClass::Long);
        assert_eq!(signals[0].sample_size, 9);
        assert!(signals[0].unavailable.is_none());
    }

    #[test]
    fn test_missing_returns_view_aborts_stage() {
        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path(), "SPY", 10);
        let engine = SignalEngine::new(
            FixedForecaster(Forecast::Value(0.0)),
            0.0008,
            -0.0008,
        );

        let result = engine.build_signals(&["SPY".to_string(), "QQQ".to_string()], &store);

        assert!(matches!(
            result,
            Err(SignalError::MissingReturns { ref symbol, .. }) if symbol == "QQQ"
        ));
    }

    #[test]
    fn test_unavailable_forecast_is_flat_but_tagged() {
        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path(), "SPY", 10);
        let engine = SignalEngine::new(
            FixedForecaster(Forecast::Unavailable(UnavailableReason::TooShort {
                len: 9,
                min: 100,
            })),
            0.0008,
            -0.0008,
        );

        let signals = engine
            .build_signals(&["SPY".to_string()], &store)
            .unwrap();

        assert_eq!(signals[0].classification, SignalClass::Flat);
        assert_eq!(signals[0].forecast_return, 0.0);
        assert!(signals[0].unavailable.is_some());
    }

    #[test]
    fn test_empty_returns_view_aborts_stage() {
        let dir = tempdir().unwrap();
        let store = CsvBarStore::new(dir.path());
        store.save_bars("SPY", &[test_bar(1, "100")]).unwrap();
        store.save_returns("SPY", &[]).unwrap();

        let engine = SignalEngine::new(
            FixedForecaster(Forecast::Value(0.0)),
            0.0008,
            -0.0008,
        );

        let result = engine.build_signals(&["SPY".to_string()], &store);
        assert!(matches!(result, Err(SignalError::EmptyReturns { .. })));
    }
}
