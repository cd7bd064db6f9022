//! Average True Range indicator.
//!
//! TR[0] = H[0] - L[0], TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR(n) is the simple moving average of TR over n bars.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

pub fn calculate_atr(series: &PriceSeries, period: usize) -> IndicatorSeries {
    if period == 0 || series.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Atr(period));
    }

    let bars = series.bars();
    let true_ranges: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let values = bars
        .iter()
        .zip(rolling_mean(&true_ranges, period))
        .map(|(bar, atr)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: atr.is_some(),
            value: atr.unwrap_or(0.0),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
