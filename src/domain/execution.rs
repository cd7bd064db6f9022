//! Fill simulation for long entries and exits.
//!
//! Implements slippage, whole-share sizing, and commissions.

use chrono::NaiveDateTime;

use super::portfolio::Portfolio;
use super::position::{ClosedTrade, Position};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecutionConfig {
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
}

/// Calculate commission: flat_fee + (trade_value * pct / 100).
pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    config.commission_per_trade + (trade_value * config.commission_pct / 100.0)
}

/// Buy fill: market_price * (1 + slippage_pct / 100)
pub fn apply_slippage_buy(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 + slippage_pct / 100.0)
}

/// Sell fill: market_price * (1 - slippage_pct / 100)
pub fn apply_slippage_sell(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 - slippage_pct / 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        quantity: u64,
        execution_price: f64,
        cost: f64,
        commission: f64,
    },
    AlreadyLong,
    InsufficientCapital,
}

/// Open a long position with `position_size` of the available cash.
///
/// Quantity is rounded down to whole shares; the entry is refused when that
/// rounds to zero or the commission pushes the total past the cash balance.
pub fn enter_long(
    portfolio: &mut Portfolio,
    market_price: f64,
    time: NaiveDateTime,
    position_size: f64,
    config: &ExecutionConfig,
) -> EntryResult {
    if !portfolio.is_flat() {
        return EntryResult::AlreadyLong;
    }

    let execution_price = apply_slippage_buy(market_price, config.slippage_pct);
    if !(execution_price.is_finite() && execution_price > 0.0) {
        return EntryResult::InsufficientCapital;
    }

    let available_capital = portfolio.cash * position_size;
    let quantity = (available_capital / execution_price).floor();
    if !(quantity >= 1.0) {
        return EntryResult::InsufficientCapital;
    }
    let quantity = quantity as u64;

    let cost = quantity as f64 * execution_price;
    let commission = calculate_commission(cost, config);
    let total_cost = cost + commission;

    if total_cost > portfolio.cash {
        return EntryResult::InsufficientCapital;
    }

    portfolio.cash -= total_cost;
    portfolio.position = Some(Position {
        quantity,
        entry_price: execution_price,
        entry_time: time,
        entry_commission: commission,
    });

    EntryResult::Entered {
        quantity,
        execution_price,
        cost,
        commission,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub quantity: u64,
    pub exit_price: f64,
    pub exit_value: f64,
    pub exit_commission: f64,
    pub pnl: f64,
}

/// Close the open position, if any, and record the trade.
///
/// PnL includes both the entry and the exit commission.
pub fn exit_long(
    portfolio: &mut Portfolio,
    market_price: f64,
    exit_time: NaiveDateTime,
    config: &ExecutionConfig,
) -> Option<ExitResult> {
    let position = portfolio.position.take()?;

    let exit_price = apply_slippage_sell(market_price, config.slippage_pct);
    let exit_value = position.quantity as f64 * exit_price;
    let exit_commission = calculate_commission(exit_value, config);

    let price_pnl = position.quantity as f64 * (exit_price - position.entry_price);
    let pnl = price_pnl - position.entry_commission - exit_commission;

    portfolio.cash += exit_value - exit_commission;
    portfolio.record_trade(ClosedTrade {
        quantity: position.quantity,
        entry_price: position.entry_price,
        exit_price,
        entry_time: position.entry_time,
        exit_time,
        commission: position.entry_commission + exit_commission,
        pnl,
    });

    Some(ExitResult {
        quantity: position.quantity,
        exit_price,
        exit_value,
        exit_commission,
        pnl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn make_config() -> ExecutionConfig {
        ExecutionConfig {
            commission_per_trade: 10.0,
            commission_pct: 0.1,
            slippage_pct: 0.05,
        }
    }

    #[test]
    fn calculate_commission_basic() {
        let commission = calculate_commission(10_000.0, &make_config());
        let expected = 10.0 + (10_000.0 * 0.1 / 100.0);
        assert!((commission - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn slippage_moves_against_trader() {
        assert!((apply_slippage_buy(100.0, 0.05) - 100.05).abs() < 1e-9);
        assert!((apply_slippage_sell(100.0, 0.05) - 99.95).abs() < 1e-9);
    }

    #[test]
    fn enter_long_sizes_whole_shares() {
        let mut portfolio = Portfolio::new(10_000.0);
        let config = ExecutionConfig::default();

        let result = enter_long(&mut portfolio, 30.0, ts(2), 1.0, &config);

        // floor(10000 / 30) = 333
        assert_eq!(
            result,
            EntryResult::Entered {
                quantity: 333,
                execution_price: 30.0,
                cost: 9_990.0,
                commission: 0.0,
            }
        );
        assert!((portfolio.cash - 10.0).abs() < 1e-9);
        assert_eq!(portfolio.position.as_ref().unwrap().quantity, 333);
    }

    #[test]
    fn enter_long_respects_position_size() {
        let mut portfolio = Portfolio::new(10_000.0);
        enter_long(&mut portfolio, 100.0, ts(2), 0.25, &ExecutionConfig::default());
        assert_eq!(portfolio.position.as_ref().unwrap().quantity, 25);
        assert!((portfolio.cash - 7_500.0).abs() < 1e-9);
    }

    #[test]
    fn enter_long_refuses_when_too_expensive() {
        let mut portfolio = Portfolio::new(50.0);
        let result = enter_long(&mut portfolio, 100.0, ts(2), 1.0, &ExecutionConfig::default());
        assert_eq!(result, EntryResult::InsufficientCapital);
        assert!(portfolio.is_flat());
    }

    #[test]
    fn enter_long_refuses_when_commission_exceeds_cash() {
        let mut portfolio = Portfolio::new(1_000.0);
        let config = ExecutionConfig {
            commission_per_trade: 5.0,
            ..Default::default()
        };
        let result = enter_long(&mut portfolio, 100.0, ts(2), 1.0, &config);
        assert_eq!(result, EntryResult::InsufficientCapital);
    }

    #[test]
    fn enter_long_refuses_nan_price() {
        let mut portfolio = Portfolio::new(1_000.0);
        let result = enter_long(&mut portfolio, f64::NAN, ts(2), 1.0, &ExecutionConfig::default());
        assert_eq!(result, EntryResult::InsufficientCapital);
    }

    #[test]
    fn enter_long_twice_is_refused() {
        let mut portfolio = Portfolio::new(10_000.0);
        let config = ExecutionConfig::default();
        enter_long(&mut portfolio, 10.0, ts(2), 0.5, &config);
        let second = enter_long(&mut portfolio, 10.0, ts(3), 0.5, &config);
        assert_eq!(second, EntryResult::AlreadyLong);
    }

    #[test]
    fn exit_long_round_trip_with_costs() {
        let mut portfolio = Portfolio::new(10_000.0);
        let config = make_config();

        let entry = enter_long(&mut portfolio, 100.0, ts(2), 1.0, &config);
        let EntryResult::Entered {
            quantity,
            execution_price,
            commission: entry_commission,
            ..
        } = entry
        else {
            panic!("expected entry");
        };

        let exit = exit_long(&mut portfolio, 110.0, ts(9), &config).unwrap();

        let sell_price = 110.0 * (1.0 - 0.05 / 100.0);
        let exit_value = quantity as f64 * sell_price;
        let exit_commission = 10.0 + exit_value * 0.1 / 100.0;
        let expected_pnl = quantity as f64 * (sell_price - execution_price)
            - entry_commission
            - exit_commission;

        assert!((exit.pnl - expected_pnl).abs() < 1e-6);
        assert!((portfolio.cash - (10_000.0 + expected_pnl)).abs() < 1e-6);
        assert!(portfolio.is_flat());
        assert_eq!(portfolio.closed_trades.len(), 1);
        assert_eq!(portfolio.closed_trades[0].exit_time, ts(9));
    }

    #[test]
    fn exit_long_without_position_is_none() {
        let mut portfolio = Portfolio::new(10_000.0);
        assert!(exit_long(&mut portfolio, 100.0, ts(2), &ExecutionConfig::default()).is_none());
        assert!(portfolio.closed_trades.is_empty());
    }
}
