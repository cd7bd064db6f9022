//! Open position and closed trade records.

use chrono::NaiveDateTime;

/// A long position held in the simulated account.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub quantity: u64,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub entry_commission: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.entry_price) - self.entry_commission
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub quantity: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    /// Entry plus exit commission.
    pub commission: f64,
    pub pnl: f64,
}

impl ClosedTrade {
    /// PnL relative to the capital put in at entry.
    pub fn return_pct(&self) -> f64 {
        let invested = self.quantity as f64 * self.entry_price;
        if invested > 0.0 {
            self.pnl / invested
        } else {
            0.0
        }
    }

    pub fn duration_days(&self) -> i64 {
        (self.exit_time - self.entry_time).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample_position() -> Position {
        Position {
            quantity: 100,
            entry_price: 50.0,
            entry_time: ts(1),
            entry_commission: 10.0,
        }
    }

    #[test]
    fn market_value() {
        assert!((sample_position().market_value(55.0) - 5500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_includes_entry_commission() {
        let pos = sample_position();
        assert!((pos.unrealized_pnl(55.0) - 490.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pnl(45.0) + 510.0).abs() < f64::EPSILON);
    }

    #[test]
    fn closed_trade_return_and_duration() {
        let trade = ClosedTrade {
            quantity: 10,
            entry_price: 100.0,
            exit_price: 110.0,
            entry_time: ts(1),
            exit_time: ts(11),
            commission: 0.0,
            pnl: 100.0,
        };
        assert!((trade.return_pct() - 0.1).abs() < f64::EPSILON);
        assert_eq!(trade.duration_days(), 10);
    }

    #[test]
    fn zero_quantity_return_is_zero() {
        let trade = ClosedTrade {
            quantity: 0,
            entry_price: 100.0,
            exit_price: 110.0,
            entry_time: ts(1),
            exit_time: ts(2),
            commission: 0.0,
            pnl: 0.0,
        };
        assert_eq!(trade.return_pct(), 0.0);
    }
}
