//! CCI zero-line recovery rule.
//!
//! Entry at bar i when CCI was below -100 `window` bars ago, has risen over
//! the window, and is now at or above zero. Exit is the mirror image: CCI was
//! above +100, has fallen, and is now at or below zero. Every CCI value in the
//! window must be valid and finite.

use tracing::debug;

use crate::domain::error::StocksigError;
use crate::domain::indicator::cci::calculate_cci;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{SignalPair, require_input};

const OVERSOLD: f64 = -100.0;
const OVERBOUGHT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CciCrossParams {
    pub cci_period: usize,
    pub window: usize,
}

impl Default for CciCrossParams {
    fn default() -> Self {
        CciCrossParams {
            cci_period: 14,
            window: 5,
        }
    }
}

pub fn generate_cci_cross_signals(
    series: &PriceSeries,
    params: &CciCrossParams,
) -> Result<SignalPair, StocksigError> {
    require_input(
        series,
        &[("cci_period", params.cci_period), ("window", params.window)],
    )?;

    let cci = calculate_cci(series, params.cci_period);
    let mut signals = SignalPair::with_len(series.len());

    for i in params.window..series.len() {
        let window: Option<Vec<f64>> = (i - params.window..=i)
            .map(|j| cci.value_at(j).filter(|v| v.is_finite()))
            .collect();
        let Some(window) = window else {
            continue;
        };

        let then = window[0];
        let now = window[window.len() - 1];
        // Sum of first differences over the window telescopes to now - then.
        let change = now - then;

        signals.entries[i] = then < OVERSOLD && change > 0.0 && now >= 0.0;
        signals.exits[i] = then > OVERBOUGHT && change < 0.0 && now <= 0.0;
    }

    debug!(
        bars = series.len(),
        cci_period = params.cci_period,
        window = params.window,
        entries = signals.entry_count(),
        exits = signals.exit_count(),
        "cci zero cross signals generated"
    );

    Ok(signals)
}
