//! Signal-driven backtest loop.
//!
//! Long-only, one instrument, at most one open position, fills at the bar
//! close. A bar carrying both an entry and an exit is ignored.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::error::StocksigError;
use crate::domain::execution::{EntryResult, ExecutionConfig, enter_long, exit_long};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::portfolio::Portfolio;
use crate::domain::signal::SignalPair;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub initial_capital: f64,
    /// Fraction of cash committed on each entry, in (0, 1].
    pub position_size: f64,
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            start_date: None,
            end_date: None,
            initial_capital: 100_000.0,
            position_size: 1.0,
            commission_per_trade: 0.0,
            commission_pct: 0.0,
            slippage_pct: 0.0,
            risk_free_rate: 0.05,
        }
    }
}

impl BacktestConfig {
    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            commission_per_trade: self.commission_per_trade,
            commission_pct: self.commission_pct,
            slippage_pct: self.slippage_pct,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    /// Entry signals that could not be filled for lack of capital.
    pub rejected_entries: usize,
    /// Bars where entry and exit fired together.
    pub conflicting_bars: usize,
}

pub fn run_backtest(
    series: &PriceSeries,
    signals: &SignalPair,
    config: &BacktestConfig,
) -> Result<BacktestResult, StocksigError> {
    if signals.entries.len() != series.len() || signals.exits.len() != series.len() {
        return Err(StocksigError::invalid_input(format!(
            "signal length mismatch: {} bars, {} entries, {} exits",
            series.len(),
            signals.entries.len(),
            signals.exits.len()
        )));
    }

    let exec = config.execution_config();
    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut rejected_entries = 0usize;
    let mut conflicting_bars = 0usize;
    let mut last_mark: Option<f64> = None;

    for (i, bar) in series.bars().iter().enumerate() {
        let (entry, exit) = (signals.entries[i], signals.exits[i]);

        if entry && exit {
            conflicting_bars += 1;
        } else if exit {
            if let Some(result) = exit_long(&mut portfolio, bar.close, bar.timestamp, &exec) {
                debug!(time = %bar.timestamp, price = result.exit_price, pnl = result.pnl, "exit");
            }
        } else if entry {
            match enter_long(
                &mut portfolio,
                bar.close,
                bar.timestamp,
                config.position_size,
                &exec,
            ) {
                EntryResult::Entered {
                    quantity,
                    execution_price,
                    ..
                } => {
                    debug!(time = %bar.timestamp, quantity, price = execution_price, "entry");
                }
                EntryResult::InsufficientCapital => {
                    warn!(time = %bar.timestamp, price = bar.close, "entry rejected: insufficient capital");
                    rejected_entries += 1;
                }
                EntryResult::AlreadyLong => {}
            }
        }

        // Carry the last finite close forward so a NaN bar does not poison equity.
        if bar.close.is_finite() {
            last_mark = Some(bar.close);
        }
        let equity = match last_mark {
            Some(price) => portfolio.total_equity(price),
            None => portfolio.cash,
        };
        portfolio.record_equity(bar.timestamp, equity);
    }

    debug!(
        bars = series.len(),
        trades = portfolio.closed_trades.len(),
        open = portfolio.position.is_some(),
        final_equity = portfolio.final_equity(),
        "backtest finished"
    );

    Ok(BacktestResult {
        portfolio,
        rejected_entries,
        conflicting_bars,
    })
}
