//! Entry/exit signal generation.
//!
//! Each rule turns a `PriceSeries` into a `SignalPair`: two boolean
//! sequences positionally aligned with the input bars. Positions where the
//! underlying indicators are undefined are always `false`.

pub mod breakout;
pub mod cci_cross;
pub mod ma_cross;

use crate::domain::error::StocksigError;
use crate::domain::ohlcv::PriceSeries;
use std::fmt;
use std::str::FromStr;

pub use breakout::{BreakoutParams, BreakoutState, breakout_states, generate_breakout_signals};
pub use cci_cross::{CciCrossParams, generate_cci_cross_signals};
pub use ma_cross::{MaCrossParams, generate_ma_cross_signals};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalPair {
    pub entries: Vec<bool>,
    pub exits: Vec<bool>,
}

impl SignalPair {
    pub fn with_len(len: usize) -> Self {
        Self {
            entries: vec![false; len],
            exits: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.iter().filter(|&&e| e).count()
    }

    pub fn exit_count(&self) -> usize {
        self.exits.iter().filter(|&&e| e).count()
    }

    pub fn entry_indices(&self) -> Vec<usize> {
        indices(&self.entries)
    }

    pub fn exit_indices(&self) -> Vec<usize> {
        indices(&self.exits)
    }
}

fn indices(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter_map(|(i, &f)| f.then_some(i))
        .collect()
}

/// A configured signal rule.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalRule {
    Breakout(BreakoutParams),
    MaCross(MaCrossParams),
    CciZeroCross(CciCrossParams),
}

impl SignalRule {
    pub fn generate(&self, series: &PriceSeries) -> Result<SignalPair, StocksigError> {
        match self {
            SignalRule::Breakout(p) => {
                generate_breakout_signals(series, p.ma_period, p.downtrend_lookback)
            }
            SignalRule::MaCross(p) => generate_ma_cross_signals(series, p),
            SignalRule::CciZeroCross(p) => generate_cci_cross_signals(series, p),
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            SignalRule::Breakout(_) => RuleKind::Breakout,
            SignalRule::MaCross(_) => RuleKind::MaCross,
            SignalRule::CciZeroCross(_) => RuleKind::CciZeroCross,
        }
    }
}

impl Default for SignalRule {
    fn default() -> Self {
        SignalRule::Breakout(BreakoutParams::default())
    }
}

impl fmt::Display for SignalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalRule::Breakout(p) => write!(
                f,
                "BREAKOUT(ma={}, lookback={})",
                p.ma_period, p.downtrend_lookback
            ),
            SignalRule::MaCross(p) => write!(
                f,
                "MA_CROSS(ma={}, atr={}, stop={})",
                p.ma_period, p.atr_period, p.stop_multiple
            ),
            SignalRule::CciZeroCross(p) => {
                write!(f, "CCI_ZERO_CROSS(cci={}, window={})", p.cci_period, p.window)
            }
        }
    }
}

/// Rule name as written in config files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Breakout,
    MaCross,
    CciZeroCross,
}

impl RuleKind {
    pub const NAMES: [&'static str; 3] = ["breakout", "ma_cross", "cci_zero_cross"];
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "breakout" => Ok(RuleKind::Breakout),
            "ma_cross" => Ok(RuleKind::MaCross),
            "cci_zero_cross" => Ok(RuleKind::CciZeroCross),
            other => Err(format!(
                "unknown rule '{}', expected one of: {}",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::Breakout => "breakout",
            RuleKind::MaCross => "ma_cross",
            RuleKind::CciZeroCross => "cci_zero_cross",
        };
        f.write_str(name)
    }
}

/// Shared precondition check for all rules.
pub(crate) fn require_input(
    series: &PriceSeries,
    params: &[(&str, usize)],
) -> Result<(), StocksigError> {
    if series.is_empty() {
        return Err(StocksigError::invalid_input("price series is empty"));
    }
    for (name, value) in params {
        if *value == 0 {
            return Err(StocksigError::invalid_input(format!(
                "{} must be positive",
                name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use chrono::NaiveDate;

    #[test]
    fn signal_pair_counts_and_indices() {
        let pair = SignalPair {
            entries: vec![false, true, false, true],
            exits: vec![false, false, true, false],
        };
        assert_eq!(pair.len(), 4);
        assert_eq!(pair.entry_count(), 2);
        assert_eq!(pair.exit_count(), 1);
        assert_eq!(pair.entry_indices(), vec![1, 3]);
        assert_eq!(pair.exit_indices(), vec![2]);
    }

    #[test]
    fn with_len_is_all_false() {
        let pair = SignalPair::with_len(3);
        assert_eq!(pair.entries, vec![false; 3]);
        assert_eq!(pair.exits, vec![false; 3]);
    }

    #[test]
    fn rule_kind_parses_names() {
        assert_eq!("breakout".parse::<RuleKind>(), Ok(RuleKind::Breakout));
        assert_eq!("MA-CROSS".parse::<RuleKind>(), Ok(RuleKind::MaCross));
        assert_eq!(
            " cci_zero_cross ".parse::<RuleKind>(),
            Ok(RuleKind::CciZeroCross)
        );
        assert!("rsi".parse::<RuleKind>().is_err());
    }

    #[test]
    fn rule_kind_display_round_trips() {
        for name in RuleKind::NAMES {
            let kind: RuleKind = name.parse().unwrap();
            assert_eq!(kind.to_string(), name);
        }
    }

    #[test]
    fn default_rule_is_breakout_20_10() {
        let rule = SignalRule::default();
        assert_eq!(rule.kind(), RuleKind::Breakout);
        assert_eq!(rule.to_string(), "BREAKOUT(ma=20, lookback=10)");
    }

    #[test]
    fn require_input_rejects_empty_and_zero() {
        let empty = PriceSeries::default();
        assert!(matches!(
            require_input(&empty, &[("ma_period", 20)]),
            Err(StocksigError::InvalidInput { .. })
        ));

        let series = PriceSeries::new(vec![PriceBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: 10.0,
            high: 10.0,
            low: 10.0,
            close: 10.0,
            volume: 100,
        }])
        .unwrap();
        let err = require_input(&series, &[("downtrend_lookback", 10), ("ma_period", 0)])
            .unwrap_err();
        assert!(matches!(err, StocksigError::InvalidInput { ref reason } if reason.contains("ma_period")));
        assert!(require_input(&series, &[("ma_period", 20)]).is_ok());
    }
}
