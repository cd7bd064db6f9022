//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::stooq_adapter::StooqAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{
    DataFormat, build_backtest_config, build_data_settings, build_signal_rule,
    validate_backtest_config, validate_data_config, validate_signal_config,
};
use crate::domain::error::StocksigError;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{SignalPair, SignalRule};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stocksig", about = "Trend-following signal generator and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate entry/exit signals for one ticker
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
        /// Signal rule, overriding [signals] rule
        #[arg(short, long)]
        rule: Option<String>,
        /// Write a CSV report of bars and signals
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate signals and simulate trading them
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
        #[arg(short, long)]
        rule: Option<String>,
    },
    /// List tickers available in the data directory
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range for a ticker
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Dispatch a parsed command. The error decides the process exit code.
pub fn execute(cli: Cli) -> Result<(), StocksigError> {
    match cli.command {
        Command::Signals {
            config,
            ticker,
            rule,
            output,
        } => run_signals(&config, &ticker, rule.as_deref(), output.as_deref()),
        Command::Backtest {
            config,
            ticker,
            rule,
        } => run_backtest(&config, &ticker, rule.as_deref()),
        Command::ListTickers { config } => run_list_tickers(&config),
        Command::Info { config, ticker } => run_info(&config, &ticker),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StocksigError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Build the data adapter named by `[data] format`.
pub fn open_data_port(config: &FileConfigAdapter) -> Result<Box<dyn DataPort>, StocksigError> {
    let settings = build_data_settings(config)?;
    let port: Box<dyn DataPort> = match settings.format {
        DataFormat::Csv => Box::new(CsvAdapter::new(settings.dir)),
        DataFormat::Stooq => Box::new(StooqAdapter::new(settings.dir)),
    };
    Ok(port)
}

fn load_series(
    data_port: &dyn DataPort,
    ticker: &str,
    bt_config: &BacktestConfig,
) -> Result<PriceSeries, StocksigError> {
    let series = data_port.fetch_series(ticker, bt_config.start_date, bt_config.end_date)?;
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        eprintln!(
            "Loaded {} bars for {} ({} to {})",
            series.len(),
            ticker,
            first.date(),
            last.date()
        );
    }
    Ok(series)
}

fn generate(rule: &SignalRule, series: &PriceSeries) -> Result<SignalPair, StocksigError> {
    eprintln!("Generating signals: {rule}");
    let signals = rule.generate(series)?;
    eprintln!(
        "  {} entries, {} exits",
        signals.entry_count(),
        signals.exit_count()
    );
    Ok(signals)
}

fn run_signals(
    config_path: &Path,
    ticker: &str,
    rule_override: Option<&str>,
    output: Option<&Path>,
) -> Result<(), StocksigError> {
    let config = load_config(config_path)?;
    let rule = build_signal_rule(&config, rule_override)?;
    let bt_config = build_backtest_config(&config)?;
    let data_port = open_data_port(&config)?;

    let series = load_series(data_port.as_ref(), ticker, &bt_config)?;
    let signals = generate(&rule, &series)?;

    for (bar, (&entry, &exit)) in series
        .bars()
        .iter()
        .zip(signals.entries.iter().zip(signals.exits.iter()))
    {
        if entry {
            println!("{}\tentry\t{}", bar.timestamp, bar.close);
        }
        if exit {
            println!("{}\texit\t{}", bar.timestamp, bar.close);
        }
    }

    if let Some(path) = output {
        CsvReportAdapter::new().write_signals(ticker, &series, &signals, path)?;
        eprintln!("Signals written to: {}", path.display());
    }
    Ok(())
}

fn run_backtest(
    config_path: &Path,
    ticker: &str,
    rule_override: Option<&str>,
) -> Result<(), StocksigError> {
    let config = load_config(config_path)?;
    let rule = build_signal_rule(&config, rule_override)?;
    let bt_config = build_backtest_config(&config)?;
    let data_port = open_data_port(&config)?;

    let series = load_series(data_port.as_ref(), ticker, &bt_config)?;
    let signals = generate(&rule, &series)?;

    eprintln!(
        "Running backtest: {} bars, capital {:.2}",
        series.len(),
        bt_config.initial_capital
    );
    let result = backtest_engine::run_backtest(&series, &signals, &bt_config)?;
    let metrics = Metrics::compute(&result.portfolio, bt_config.risk_free_rate);

    for trade in &result.portfolio.closed_trades {
        println!(
            "{}\t{}\t{}\t{:.4}\t{:.4}\t{:.2}",
            trade.entry_time,
            trade.exit_time,
            trade.quantity,
            trade.entry_price,
            trade.exit_price,
            trade.pnl
        );
    }

    print_summary(&metrics);
    if result.rejected_entries > 0 {
        eprintln!("Rejected entries: {}", result.rejected_entries);
    }
    if result.conflicting_bars > 0 {
        eprintln!("Conflicting bars: {}", result.conflicting_bars);
    }
    Ok(())
}

fn print_summary(metrics: &Metrics) {
    eprintln!("\n=== Results ===");
    eprintln!("Final Equity:     {:.2}", metrics.end_equity);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        metrics.annualized_return * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", metrics.sortino_ratio);
    eprintln!(
        "Max Drawdown:     -{:.1}% ({} bars)",
        metrics.max_drawdown * 100.0,
        metrics.max_drawdown_duration
    );
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Avg Win / Loss:   {:.2} / {:.2}", metrics.avg_win, metrics.avg_loss);
    eprintln!(
        "Avg Duration:     {:.1} days",
        metrics.avg_trade_duration_days
    );
    if metrics.open_position {
        eprintln!("Position still open at end of data");
    }
}

fn run_list_tickers(config_path: &Path) -> Result<(), StocksigError> {
    let config = load_config(config_path)?;
    let data_port = open_data_port(&config)?;

    let tickers = data_port.list_tickers()?;
    if tickers.is_empty() {
        eprintln!("No tickers found");
    } else {
        for ticker in &tickers {
            println!("{ticker}");
        }
        eprintln!("{} tickers found", tickers.len());
    }
    Ok(())
}

fn run_info(config_path: &Path, ticker: &str) -> Result<(), StocksigError> {
    let config = load_config(config_path)?;
    let data_port = open_data_port(&config)?;

    match data_port.get_data_range(ticker)? {
        Some((first, last, count)) => {
            println!("{ticker}\t{first}\t{last}\t{count}");
            Ok(())
        }
        None => Err(StocksigError::NoData {
            ticker: ticker.to_string(),
        }),
    }
}

fn run_validate(config_path: &Path) -> Result<(), StocksigError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    validate_signal_config(&config)?;
    validate_backtest_config(&config)?;

    let rule = build_signal_rule(&config, None)?;
    let settings = build_data_settings(&config)?;
    eprintln!("Data:   {} ({})", settings.dir.display(), settings.format);
    eprintln!("Rule:   {rule}");
    eprintln!("Config validated successfully");
    Ok(())
}
