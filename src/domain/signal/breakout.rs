//! Moving-average breakout after a confirmed downtrend.
//!
//! Entry fires on the bar where the close crosses above its simple moving
//! average, provided the `downtrend_lookback` bars before it all closed
//! strictly below the average. The position is held until the first close
//! back below the average; the exit fires on that bar if the previous close
//! was at or above the average.
//!
//! Comparisons follow IEEE-754: a NaN close or NaN average makes every
//! comparison it takes part in false, so missing data can only suppress
//! signals, never raise an error.

use tracing::debug;

use crate::domain::error::StocksigError;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{SignalPair, require_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakoutParams {
    pub ma_period: usize,
    pub downtrend_lookback: usize,
}

impl Default for BreakoutParams {
    fn default() -> Self {
        BreakoutParams {
            ma_period: 20,
            downtrend_lookback: 10,
        }
    }
}

/// Per-bar derived state. Undefined positions are `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakoutState {
    pub below_ma: bool,
    pub was_downtrend: bool,
    pub breakout: bool,
    pub confirmed_breakout: bool,
    pub holding: bool,
    pub cross_down: bool,
}

/// Compute the derived state for every bar in a single forward pass.
pub fn breakout_states(
    series: &PriceSeries,
    params: &BreakoutParams,
) -> Result<Vec<BreakoutState>, StocksigError> {
    require_input(
        series,
        &[
            ("ma_period", params.ma_period),
            ("downtrend_lookback", params.downtrend_lookback),
        ],
    )?;

    let ma = calculate_sma(series, params.ma_period);
    let bars = series.bars();
    let mut states: Vec<BreakoutState> = Vec::with_capacity(bars.len());
    let mut below_run = 0usize;

    for (i, bar) in bars.iter().enumerate() {
        let close = bar.close;
        let ma_now = ma.value_at(i);

        let below_ma = ma_now.is_some_and(|m| close < m);
        below_run = if below_ma { below_run + 1 } else { 0 };
        let was_downtrend = below_run >= params.downtrend_lookback;

        let mut state = BreakoutState {
            below_ma,
            was_downtrend,
            ..BreakoutState::default()
        };

        if i > 0 {
            let prev = states[i - 1];
            let prev_close = bars[i - 1].close;
            let ma_prev = ma.value_at(i - 1);

            state.breakout = match (ma_now, ma_prev) {
                (Some(m), Some(pm)) => close > m && prev_close <= pm,
                _ => false,
            };
            state.confirmed_breakout = state.breakout && prev.was_downtrend;

            state.holding = if state.confirmed_breakout {
                true
            } else if below_ma {
                false
            } else {
                prev.holding
            };

            state.cross_down =
                prev.holding && below_ma && ma_prev.is_some_and(|pm| prev_close >= pm);
        }

        states.push(state);
    }

    Ok(states)
}

/// Entry/exit signals for the breakout rule.
///
/// Fails with `InvalidInput` when `series` is empty or either parameter is
/// zero. The returned sequences have the same length as `series`.
pub fn generate_breakout_signals(
    series: &PriceSeries,
    ma_period: usize,
    downtrend_lookback: usize,
) -> Result<SignalPair, StocksigError> {
    let params = BreakoutParams {
        ma_period,
        downtrend_lookback,
    };
    let states = breakout_states(series, &params)?;

    let signals = SignalPair {
        entries: states.iter().map(|s| s.confirmed_breakout).collect(),
        exits: states.iter().map(|s| s.cross_down).collect(),
    };

    debug!(
        bars = series.len(),
        ma_period,
        downtrend_lookback,
        entries = signals.entry_count(),
        exits = signals.exit_count(),
        "breakout signals generated"
    );

    Ok(signals)
}
