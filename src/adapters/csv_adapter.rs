//! CSV file data adapter.
//!
//! One file per ticker, `<dir>/<TICKER>.csv`, with the header
//! `date,open,high,low,close,volume`. Extra columns are ignored.

use crate::domain::error::StocksigError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Exact `<TICKER>.csv` first, then a case-insensitive match.
    fn csv_path(&self, ticker: &str) -> Option<PathBuf> {
        let exact = self.base_path.join(format!("{ticker}.csv"));
        if exact.is_file() {
            return Some(exact);
        }
        let entries = fs::read_dir(&self.base_path).ok()?;
        entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .find(|p| ticker_of(p).is_some_and(|t| t.eq_ignore_ascii_case(ticker)))
    }

    fn load(&self, ticker: &str) -> Result<Option<PriceSeries>, StocksigError> {
        let Some(path) = self.csv_path(ticker) else {
            return Ok(None);
        };
        read_csv_file(&path).map(Some)
    }
}

fn ticker_of(path: &Path) -> Option<&str> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and the `T`-separated form.
pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Non-negative finite volumes only; fractional volumes are rounded.
pub(crate) fn volume_from_f64(v: f64) -> Option<u64> {
    (v.is_finite() && v >= 0.0).then(|| v.round() as u64)
}

fn read_csv_file(path: &Path) -> Result<PriceSeries, StocksigError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(column)) {
            return Err(StocksigError::data(format!(
                "{}: missing column '{}'",
                path.display(),
                column
            )));
        }
    }
    let lowered: csv::StringRecord = headers.iter().map(str::to_lowercase).collect();
    rdr.set_headers(lowered);

    let mut bars = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!(file = %path.display(), line = line + 2, error = %e, "skipping malformed row");
                skipped += 1;
                continue;
            }
        };
        let (Some(timestamp), Some(volume)) = (parse_timestamp(&row.date), volume_from_f64(row.volume))
        else {
            warn!(file = %path.display(), line = line + 2, date = %row.date, "skipping row with bad date or volume");
            skipped += 1;
            continue;
        };
        bars.push(PriceBar {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume,
        });
    }

    debug!(file = %path.display(), rows = bars.len(), skipped, "loaded csv");

    PriceSeries::from_unsorted(bars)
        .map_err(|e| StocksigError::data(format!("{}: {}", path.display(), e)))
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, StocksigError> {
        let series = self
            .load(ticker)?
            .map(|s| s.between(start, end))
            .unwrap_or_default();
        if series.is_empty() {
            return Err(StocksigError::NoData {
                ticker: ticker.to_string(),
            });
        }
        Ok(series)
    }

    fn list_tickers(&self) -> Result<Vec<String>, StocksigError> {
        let mut tickers: Vec<String> = fs::read_dir(&self.base_path)?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter_map(|p| ticker_of(&p).map(str::to_string))
            .collect();
        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, StocksigError> {
        let Some(series) = self.load(ticker)? else {
            return Ok(None);
        };
        Ok(series
            .first()
            .zip(series.last())
            .map(|(first, last)| (first.timestamp, last.timestamp, series.len())))
    }
}
