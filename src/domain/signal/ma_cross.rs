//! Moving-average cross with an ATR trailing stop.
//!
//! Entry: close crosses above SMA(ma_period).
//! Exit: close at or below a trailing stop. On an entry bar the stop resets to
//! `low - stop_multiple * ATR`; on every other bar it ratchets up to the
//! larger of the previous stop and that same expression. No stop exists
//! before the first entry.

use tracing::debug;

use crate::domain::error::StocksigError;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{SignalPair, require_input};

#[derive(Debug, Clone, PartialEq)]
pub struct MaCrossParams {
    pub ma_period: usize,
    pub atr_period: usize,
    pub stop_multiple: f64,
}

impl Default for MaCrossParams {
    fn default() -> Self {
        MaCrossParams {
            ma_period: 150,
            atr_period: 14,
            stop_multiple: 3.0,
        }
    }
}

pub fn generate_ma_cross_signals(
    series: &PriceSeries,
    params: &MaCrossParams,
) -> Result<SignalPair, StocksigError> {
    require_input(
        series,
        &[
            ("ma_period", params.ma_period),
            ("atr_period", params.atr_period),
        ],
    )?;
    if !(params.stop_multiple.is_finite() && params.stop_multiple > 0.0) {
        return Err(StocksigError::invalid_input(
            "stop_multiple must be a positive number",
        ));
    }

    let ma = calculate_sma(series, params.ma_period);
    let atr = calculate_atr(series, params.atr_period);
    let bars = series.bars();
    let mut signals = SignalPair::with_len(bars.len());
    let mut stop: Option<f64> = None;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            signals.entries[i] = match (ma.value_at(i), ma.value_at(i - 1)) {
                (Some(m), Some(pm)) => bar.close > m && bars[i - 1].close <= pm,
                _ => false,
            };
        }

        let candidate = atr
            .value_at(i)
            .map(|a| bar.low - params.stop_multiple * a)
            .filter(|c| !c.is_nan());

        stop = if signals.entries[i] {
            candidate
        } else {
            match (stop, candidate) {
                (Some(s), Some(c)) => Some(s.max(c)),
                (s, _) => s,
            }
        };

        signals.exits[i] = stop.is_some_and(|s| bar.close <= s);
    }

    debug!(
        bars = series.len(),
        ma_period = params.ma_period,
        atr_period = params.atr_period,
        entries = signals.entry_count(),
        exits = signals.exit_count(),
        "ma cross signals generated"
    );

    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use chrono::NaiveDate;

    fn make_series(prices: &[f64], spread: f64) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars = prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + spread,
                low: close - spread,
                close,
                volume: 500,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    fn params() -> MaCrossParams {
        MaCrossParams {
            ma_period: 3,
            atr_period: 2,
            stop_multiple: 1.0,
        }
    }

    #[test]
    fn entry_on_cross_above() {
        let prices = [10.0, 9.0, 8.0, 7.0, 12.0, 13.0];
        let signals = generate_ma_cross_signals(&make_series(&prices, 0.5), &params()).unwrap();
        // SMA(3) at 3 = 8, at 4 = 9: 7 <= 8 and 12 > 9
        assert_eq!(signals.entry_indices(), vec![4]);
    }

    #[test]
    fn no_exit_before_first_entry() {
        let prices = [10.0, 9.0, 8.0, 7.0, 6.0, 5.0];
        let signals = generate_ma_cross_signals(&make_series(&prices, 0.5), &params()).unwrap();
        assert_eq!(signals.entry_count(), 0);
        assert_eq!(signals.exit_count(), 0);
    }

    #[test]
    fn trailing_stop_triggers_exit() {
        // Stop after entry: 8.0, 9.0, 12.0, then the close of 10 breaches it.
        let prices = [10.0, 9.0, 8.0, 7.0, 12.0, 13.0, 14.0, 10.0];
        let signals = generate_ma_cross_signals(&make_series(&prices, 0.5), &params()).unwrap();

        assert_eq!(signals.entry_indices(), vec![4]);
        assert!(signals.exits[7]);
        assert!(!signals.exits[4] && !signals.exits[5] && !signals.exits[6]);
    }

    #[test]
    fn rejects_bad_stop_multiple() {
        let p = MaCrossParams {
            stop_multiple: 0.0,
            ..params()
        };
        let err = generate_ma_cross_signals(&make_series(&[1.0, 2.0], 0.5), &p).unwrap_err();
        assert!(matches!(err, StocksigError::InvalidInput { .. }));
    }

    #[test]
    fn rejects_empty_series() {
        let err = generate_ma_cross_signals(&PriceSeries::default(), &params()).unwrap_err();
        assert!(matches!(err, StocksigError::InvalidInput { .. }));
    }
}
