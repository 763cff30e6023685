//! Signal module
//!
//! Threshold classification of return forecasts into trade signals

mod engine;

pub use engine::SignalEngine;

use crate::model::UnavailableReason;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discrete trade signal classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalClass {
    Long,
    Short,
    Flat,
}

impl std::fmt::Display for SignalClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalClass::Long => write!(f, "long"),
            SignalClass::Short => write!(f, "short"),
            SignalClass::Flat => write!(f, "flat"),
        }
    }
}

/// Classify a forecast return against the thresholds.
///
/// Threshold equality is flat: long and short require strict inequality.
pub fn classify(forecast_return: f64, up_threshold: f64, down_threshold: f64) -> SignalClass {
    if forecast_return > up_threshold {
        SignalClass::Long
    } else if forecast_return < down_threshold {
        SignalClass::Short
    } else {
        SignalClass::Flat
    }
}

/// A per-symbol trade signal for one strategy run. Ephemeral: consumed by
/// the order engine, never persisted on its own.
#[derive(Debug, Clone)]
pub struct Signal {
    pub symbol: String,
    pub forecast_return: f64,
    pub classification: SignalClass,
    /// Length of the cleaned return series fed to the forecaster
    pub sample_size: usize,
    /// Present when the forecaster soft-failed and the zero forecast is
    /// synthetic rather than modeled
    pub unavailable: Option<UnavailableReason>,
}

/// Signal-building errors.
///
/// These are pipeline precondition violations, not transient faults: the
/// sync stage is expected to have produced a returns view for every
/// symbol, so any failure here aborts the whole signal-building stage.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("returns view unavailable for {symbol}: {source}")]
    MissingReturns { symbol: String, source: StoreError },
    #[error("returns view for {symbol} has no usable rows")]
    EmptyReturns { symbol: String },
}
