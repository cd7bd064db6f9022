//! Commodity Channel Index indicator.
//!
//! TP = (H + L + C) / 3
//! CCI(n)[i] = (TP[i] - SMA(TP, n)[i]) / (0.015 * MD[i])
//! where MD is the mean absolute deviation of TP around its SMA over the window.
//! Warmup: first (n-1) bars are invalid. A zero mean deviation yields 0.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

const CCI_CONSTANT: f64 = 0.015;

pub fn calculate_cci(series: &PriceSeries, period: usize) -> IndicatorSeries {
    if period == 0 || series.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Cci(period));
    }

    let typical: Vec<f64> = series.bars().iter().map(|b| b.typical_price()).collect();
    let warmup = period - 1;
    let mut values = Vec::with_capacity(typical.len());

    for (i, bar) in series.bars().iter().enumerate() {
        let valid = i >= warmup;

        let value = if valid {
            let window = &typical[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let mean_dev = window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;

            if mean_dev == 0.0 {
                0.0
            } else {
                (typical[i] - mean) / (CCI_CONSTANT * mean_dev)
            }
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Cci(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(prices: &[f64]) -> PriceSeries {
        let bars = prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn cci_warmup() {
        let series = calculate_cci(&make_series(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
    }

    #[test]
    fn cci_known_value() {
        // TP = close here; window [1, 2, 3]: mean 2, MD = 2/3
        // CCI = (3 - 2) / (0.015 * 2/3) = 100
        let series = calculate_cci(&make_series(&[1.0, 2.0, 3.0]), 3);
        assert_relative_eq!(series.value_at(2).unwrap(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn cci_falling_is_negative() {
        let series = calculate_cci(&make_series(&[3.0, 2.0, 1.0]), 3);
        assert_relative_eq!(series.value_at(2).unwrap(), -100.0, epsilon = 1e-9);
    }

    #[test]
    fn cci_flat_is_zero() {
        let series = calculate_cci(&make_series(&[5.0; 6]), 3);
        for i in 2..6 {
            assert_eq!(series.value_at(i), Some(0.0));
        }
    }

    #[test]
    fn cci_empty_input() {
        let series = calculate_cci(&PriceSeries::default(), 14);
        assert!(series.is_empty());
        assert_eq!(series.indicator_type, IndicatorType::Cci(14));
    }
}
