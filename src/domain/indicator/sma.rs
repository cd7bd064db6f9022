//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

pub fn calculate_sma(series: &PriceSeries, period: usize) -> IndicatorSeries {
    let closes = series.closes();
    let values = rolling_mean(&closes, period);

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values: series
            .bars()
            .iter()
            .zip(values)
            .map(|(bar, value)| IndicatorPoint {
                timestamp: bar.timestamp,
                valid: value.is_some(),
                value: value.unwrap_or(0.0),
            })
            .collect(),
    }
}

/// Trailing mean over `period` values, `None` during warmup.
///
/// Every window is summed from scratch so no rounding error carries over
/// from earlier bars. A window of identical values yields that value
/// exactly, and a window holding a non-finite value yields NaN.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return Vec::new();
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                Some(window_mean(&values[i + 1 - period..=i]))
            }
        })
        .collect()
}

fn window_mean(window: &[f64]) -> f64 {
    let Some(&first) = window.first() else {
        return f64::NAN;
    };
    if window.iter().any(|v| !v.is_finite()) {
        return f64::NAN;
    }
    if window.iter().all(|&v| v == first) {
        return first;
    }
    window.iter().sum::<f64>() / window.len() as f64
}
