//! Performance statistics over a finished backtest.

use super::portfolio::{EquityPoint, Portfolio};

const PERIODS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub start_equity: f64,
    pub end_equity: f64,
    pub total_profit: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    /// Longest run of bars spent below a prior equity peak.
    pub max_drawdown_duration: usize,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub best_trade_return: f64,
    pub worst_trade_return: f64,
    pub avg_trade_duration_days: f64,
    pub open_position: bool,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio, risk_free_rate: f64) -> Self {
        let start_equity = portfolio.initial_capital;
        let end_equity = portfolio.final_equity();
        let total_profit = end_equity - start_equity;
        let total_return = if start_equity > 0.0 {
            total_profit / start_equity
        } else {
            0.0
        };

        let years = portfolio.equity_curve.len() as f64 / PERIODS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = drawdown(&portfolio.equity_curve);
        let (sharpe_ratio, sortino_ratio) =
            risk_adjusted(&portfolio.equity_curve, risk_free_rate / PERIODS_PER_YEAR);

        let trades = &portfolio.closed_trades;
        let wins: Vec<f64> = trades.iter().map(|t| t.pnl).filter(|&p| p > 0.0).collect();
        let losses: Vec<f64> = trades
            .iter()
            .map(|t| t.pnl)
            .filter(|&p| p < 0.0)
            .map(f64::abs)
            .collect();
        let gross_win: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum();

        let total_trades = trades.len();
        let win_rate = ratio(wins.len() as f64, total_trades as f64);
        let profit_factor = if gross_loss > 0.0 {
            gross_win / gross_loss
        } else if gross_win > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let returns = trades.iter().map(|t| t.return_pct());
        let best_trade_return = returns.clone().fold(0.0_f64, f64::max);
        let worst_trade_return = returns.fold(0.0_f64, f64::min);

        let total_days: i64 = trades.iter().map(|t| t.duration_days()).sum();

        Metrics {
            start_equity,
            end_equity,
            total_profit,
            total_return,
            annualized_return,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            max_drawdown_duration,
            total_trades,
            trades_won: wins.len(),
            trades_lost: losses.len(),
            win_rate,
            profit_factor,
            avg_win: ratio(gross_win, wins.len() as f64),
            avg_loss: ratio(gross_loss, losses.len() as f64),
            best_trade_return,
            worst_trade_return,
            avg_trade_duration_days: ratio(total_days as f64, total_trades as f64),
            open_position: portfolio.position.is_some(),
        }
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

fn drawdown(curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut run = 0usize;
    let mut max_run = 0usize;

    for point in curve {
        if point.equity >= peak {
            peak = point.equity;
            run = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
            run += 1;
            max_run = max_run.max(run);
        }
    }

    (max_dd, max_run)
}

fn risk_adjusted(curve: &[EquityPoint], period_rf: f64) -> (f64, f64) {
    if curve.len() < 2 {
        return (0.0, 0.0);
    }

    let returns: Vec<f64> = curve
        .windows(2)
        .map(|w| ratio(w[1].equity - w[0].equity, w[0].equity))
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let stddev = (returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt();
    let excess = mean - period_rf;
    let annualize = PERIODS_PER_YEAR.sqrt();

    let sharpe = if stddev > 0.0 {
        excess / stddev * annualize
    } else {
        0.0
    };

    let downside = (returns
        .iter()
        .filter(|&&r| r < period_rf)
        .map(|r| (r - period_rf).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();

    let sortino = if downside > 0.0 {
        excess / downside * annualize
    } else {
        0.0
    };

    (sharpe, sortino)
}
