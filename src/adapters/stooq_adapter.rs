//! Stooq bulk-export data adapter.
//!
//! Stooq ships one text file per instrument, nested in per-market
//! directories (`daily/us/nasdaq stocks/1/aapl.us.txt`). Each file has one
//! header row followed by
//! `TICKER,PER,DATE,TIME,OPEN,HIGH,LOW,CLOSE,VOL,OPENINT` records with
//! `DATE` as `YYYYMMDD` and `TIME` as `HHMMSS`.

use crate::adapters::csv_adapter::volume_from_f64;
use crate::domain::error::StocksigError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct StooqRow {
    _ticker: String,
    _period: String,
    date: String,
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(default)]
    _open_interest: Option<f64>,
}

pub struct StooqAdapter {
    base_path: PathBuf,
}

impl StooqAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Every `.txt` file under the base directory, keyed by upper-case ticker.
    /// When two markets carry the same ticker the first path in sorted order wins.
    fn index(&self) -> Result<BTreeMap<String, PathBuf>, StocksigError> {
        let mut files = Vec::new();
        collect_txt_files(&self.base_path, &mut files)?;
        files.sort();

        let mut index = BTreeMap::new();
        for path in files {
            if let Some(ticker) = ticker_of(&path) {
                index.entry(ticker).or_insert(path);
            }
        }
        Ok(index)
    }

    fn load(&self, ticker: &str) -> Result<Option<PriceSeries>, StocksigError> {
        let key = ticker.to_uppercase();
        match self.index()?.get(&key) {
            Some(path) => read_stooq_file(path).map(Some),
            None => Ok(None),
        }
    }
}

fn collect_txt_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), StocksigError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_txt_files(&path, out)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        {
            out.push(path);
        }
    }
    Ok(())
}

/// `aapl.us.txt` -> `AAPL`. The market suffix is dropped.
fn ticker_of(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let ticker = stem.split('.').next().filter(|t| !t.is_empty())?;
    Some(ticker.to_uppercase())
}

fn parse_stooq_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y%m%d").ok()?;
    let hhmmss: u32 = time.trim().parse().ok()?;
    let time = NaiveTime::from_hms_opt(hhmmss / 10_000, (hhmmss / 100) % 100, hhmmss % 100)?;
    Some(date.and_time(time))
}

fn read_stooq_file(path: &Path) -> Result<PriceSeries, StocksigError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut bars = Vec::new();
    let mut skipped = 0usize;

    for (line, record) in rdr.records().enumerate() {
        // Positional: Stooq headers are bracketed (`<DATE>`) and vary by export.
        let row = record.and_then(|r| r.deserialize::<StooqRow>(None));
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(file = %path.display(), line = line + 2, error = %e, "skipping malformed row");
                skipped += 1;
                continue;
            }
        };
        let (Some(timestamp), Some(volume)) = (
            parse_stooq_timestamp(&row.date, &row.time),
            volume_from_f64(row.volume),
        ) else {
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

    debug!(file = %path.display(), rows = bars.len(), skipped, "loaded stooq file");

    PriceSeries::from_unsorted(bars)
        .map_err(|e| StocksigError::data(format!("{}: {}", path.display(), e)))
}

impl DataPort for StooqAdapter {
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
        Ok(self.index()?.into_keys().collect())
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
