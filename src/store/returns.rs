//! Returns view derived from close prices

use super::Bar;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One daily percent return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    /// Timestamp of the later of the two bars
    pub ts: DateTime<Utc>,
    /// Simple percent return over the previous close
    #[serde(rename = "return")]
    pub pct_return: f64,
}

/// Compute the full returns view over a bar store.
///
/// `pct_return[t] = (close[t] - close[t-1]) / close[t-1]`, one row fewer
/// than the store. Always recomputed in full after a sync; the view is
/// derived, never patched in place. A zero previous close yields a
/// non-finite return, which downstream consumers discard.
pub fn compute_returns(bars: &[Bar]) -> Vec<Return> {
    bars.windows(2)
        .map(|pair| {
            let prev = pair[0].close.to_f64().unwrap_or(f64::NAN);
            let cur = pair[1].close.to_f64().unwrap_or(f64::NAN);
            Return {
                ts: pair[1].ts,
                pct_return: (cur - prev) / prev,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_bar;

    #[test]
    fn test_returns_length_is_one_fewer() {
        let bars: Vec<Bar> = (1..=10).map(|d| test_bar(d, "100")).collect();
        assert_eq!(compute_returns(&bars).len(), 9);
    }

    #[test]
    fn test_returns_empty_and_single_bar() {
        assert!(compute_returns(&[]).is_empty());
        assert!(compute_returns(&[test_bar(1, "100")]).is_empty());
    }

    #[test]
    fn test_returns_values() {
        let bars = vec![test_bar(1, "100"), test_bar(2, "102"), test_bar(3, "51")];
        let returns = compute_returns(&bars);

        assert_eq!(returns.len(), 2);
        assert!((returns[0].pct_return - 0.02).abs() < 1e-12);
        assert!((returns[1].pct_return - (-0.5)).abs() < 1e-12);
        assert_eq!(returns[0].ts, bars[1].ts);
    }

    #[test]
    fn test_returns_zero_close_is_non_finite() {
        let bars = vec![test_bar(1, "0"), test_bar(2, "100")];
        let returns = compute_returns(&bars);

        assert_eq!(returns.len(), 1);
        assert!(!returns[0].pct_return.is_finite());
    }
}
