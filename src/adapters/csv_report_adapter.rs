//! CSV signal report adapter.
//!
//! Writes one row per bar with the entry and exit flags alongside the prices,
//! ready to be loaded by a charting front-end.

use crate::domain::error::StocksigError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::SignalPair;
use crate::ports::report_port::ReportPort;
use std::path::Path;
use tracing::info;

const HEADER: [&str; 8] = [
    "timestamp", "open", "high", "low", "close", "volume", "entry", "exit",
];

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_signals(
        &self,
        ticker: &str,
        series: &PriceSeries,
        signals: &SignalPair,
        output_path: &Path,
    ) -> Result<(), StocksigError> {
        if signals.len() != series.len() || signals.exits.len() != series.len() {
            return Err(StocksigError::invalid_input(format!(
                "signal length {} does not match {} bars",
                signals.len(),
                series.len()
            )));
        }

        let mut wtr = csv::Writer::from_path(output_path)?;
        wtr.write_record(HEADER)?;

        for (i, bar) in series.bars().iter().enumerate() {
            wtr.write_record([
                bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
                signals.entries[i].to_string(),
                signals.exits[i].to_string(),
            ])?;
        }
        wtr.flush()?;

        info!(
            ticker,
            path = %output_path.display(),
            rows = series.len(),
            entries = signals.entry_count(),
            exits = signals.exit_count(),
            "wrote signal report"
        );
        Ok(())
    }
}
