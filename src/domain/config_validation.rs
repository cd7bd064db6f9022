//! Configuration validation.
//!
//! Reads the `[data]`, `[signals]` and `[backtest]` sections, checks every
//! value before a run, and builds the typed settings the rest of the crate
//! consumes. A key that is present but malformed is an error, never a silent
//! fall back to its default.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::StocksigError;
use crate::domain::signal::{BreakoutParams, CciCrossParams, MaCrossParams, RuleKind, SignalRule};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Stooq,
}

impl FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(DataFormat::Csv),
            "stooq" => Ok(DataFormat::Stooq),
            other => Err(format!("unknown data format '{other}', expected csv or stooq")),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFormat::Csv => f.write_str("csv"),
            DataFormat::Stooq => f.write_str("stooq"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub format: DataFormat,
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StocksigError> {
    build_data_settings(config).map(|_| ())
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), StocksigError> {
    build_signal_rule(config, None).map(|_| ())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StocksigError> {
    build_backtest_config(config).map(|_| ())
}

pub fn build_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, StocksigError> {
    let dir = match config.get_string("data", "dir") {
        Some(d) if !d.trim().is_empty() => PathBuf::from(d.trim()),
        _ => return Err(missing("data", "dir")),
    };

    let format = match config.get_string("data", "format") {
        None => DataFormat::Csv,
        Some(s) => s
            .parse::<DataFormat>()
            .map_err(|reason| invalid("data", "format", reason))?,
    };

    Ok(DataSettings { dir, format })
}

/// Build the configured signal rule. `rule_override` (from the command line)
/// takes precedence over `[signals] rule`.
///
/// Every period in `[signals]` is checked, not only those used by the
/// selected rule, so a broken config fails whichever rule is chosen.
pub fn build_signal_rule(
    config: &dyn ConfigPort,
    rule_override: Option<&str>,
) -> Result<SignalRule, StocksigError> {
    let name = rule_override
        .map(str::to_string)
        .or_else(|| config.get_string("signals", "rule"))
        .unwrap_or_else(|| RuleKind::Breakout.to_string());
    let kind = name
        .parse::<RuleKind>()
        .map_err(|reason| invalid("signals", "rule", reason))?;

    let breakout_defaults = BreakoutParams::default();
    let ma_defaults = MaCrossParams::default();
    let cci_defaults = CciCrossParams::default();

    let ma_period = positive_usize(config, "signals", "ma_period", breakout_defaults.ma_period)?;
    let downtrend_lookback = positive_usize(
        config,
        "signals",
        "downtrend_lookback",
        breakout_defaults.downtrend_lookback,
    )?;
    let atr_period = positive_usize(config, "signals", "atr_period", ma_defaults.atr_period)?;
    let stop_multiple = float(config, "signals", "stop_multiple", ma_defaults.stop_multiple)?;
    if !(stop_multiple > 0.0) {
        return Err(invalid(
            "signals",
            "stop_multiple",
            "stop_multiple must be positive",
        ));
    }
    let cci_period = positive_usize(config, "signals", "cci_period", cci_defaults.cci_period)?;
    let cci_window = positive_usize(config, "signals", "cci_window", cci_defaults.window)?;

    // ma_cross keeps its own long-MA default unless ma_period is set.
    let rule = match kind {
        RuleKind::Breakout => SignalRule::Breakout(BreakoutParams {
            ma_period,
            downtrend_lookback,
        }),
        RuleKind::MaCross => SignalRule::MaCross(MaCrossParams {
            ma_period: if config.get_string("signals", "ma_period").is_some() {
                ma_period
            } else {
                ma_defaults.ma_period
            },
            atr_period,
            stop_multiple,
        }),
        RuleKind::CciZeroCross => SignalRule::CciZeroCross(CciCrossParams {
            cci_period,
            window: cci_window,
        }),
    };
    Ok(rule)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, StocksigError> {
    let defaults = BacktestConfig::default();

    let initial_capital = float(config, "backtest", "initial_capital", defaults.initial_capital)?;
    if !(initial_capital > 0.0) {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    let position_size = float(config, "backtest", "position_size", defaults.position_size)?;
    if !(position_size > 0.0 && position_size <= 1.0) {
        return Err(invalid(
            "backtest",
            "position_size",
            "position_size must be between 0 and 1",
        ));
    }

    let commission_per_trade = non_negative(config, "commission_per_trade")?;
    let commission_pct = non_negative(config, "commission_pct")?;
    let slippage_pct = non_negative(config, "slippage_pct")?;

    let risk_free_rate = float(config, "backtest", "risk_free_rate", defaults.risk_free_rate)?;
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }

    let start_date = optional_date(config, "start_date")?;
    let end_date = optional_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start >= end {
            return Err(invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }

    Ok(BacktestConfig {
        start_date,
        end_date,
        initial_capital,
        position_size,
        commission_per_trade,
        commission_pct,
        slippage_pct,
        risk_free_rate,
    })
}

fn missing(section: &str, key: &str) -> StocksigError {
    StocksigError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StocksigError {
    StocksigError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn positive_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, StocksigError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    // Parse as signed first so "-5" reports as non-positive, not as garbage.
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, format!("{key} must be an integer, got '{raw}'")))?;
    if value < 1 {
        return Err(invalid(section, key, format!("{key} must be positive")));
    }
    usize::try_from(value).map_err(|_| invalid(section, key, format!("{key} is too large")))
}

fn float(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, StocksigError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(section, key, format!("{key} must be a number, got '{raw}'"))),
    }
}

fn non_negative(config: &dyn ConfigPort, key: &str) -> Result<f64, StocksigError> {
    let value = float(config, "backtest", key, 0.0)?;
    if value < 0.0 {
        return Err(invalid("backtest", key, format!("{key} must be non-negative")));
    }
    Ok(value)
}

fn optional_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, StocksigError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid("backtest", key, format!("invalid {key} format, expected YYYY-MM-DD"))),
    }
}
