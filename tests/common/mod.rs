#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use stocksig::domain::error::StocksigError;
pub use stocksig::domain::ohlcv::{PriceBar, PriceSeries};
use stocksig::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, ticker: &str, series: PriceSeries) -> Self {
        self.data.insert(ticker.to_string(), series);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, StocksigError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StocksigError::data(reason.clone()));
        }
        match self.data.get(ticker).map(|s| s.between(start, end)) {
            Some(series) if !series.is_empty() => Ok(series),
            _ => Err(StocksigError::NoData {
                ticker: ticker.to_string(),
            }),
        }
    }

    fn list_tickers(&self) -> Result<Vec<String>, StocksigError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, StocksigError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StocksigError::data(reason.clone()));
        }
        Ok(self.data.get(ticker).and_then(|s| {
            s.first()
                .zip(s.last())
                .map(|(a, b)| (a.timestamp, b.timestamp, s.len()))
        }))
    }
}

pub fn day(offset: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(offset as i64)
}

pub fn make_bar(offset: usize, close: f64) -> PriceBar {
    PriceBar {
        timestamp: day(offset),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1000,
    }
}

/// One bar per calendar day from 2024-01-01.
pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(i, c))
            .collect(),
    )
    .unwrap()
}

/// 20 falling bars, a six-bar rally well above the MA, then a collapse.
/// With ma_period 5 and lookback 10: entry at bar 20, exit at bar 26.
pub fn breakout_then_breakdown_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
    closes.extend([120.0, 125.0, 130.0, 135.0, 140.0, 145.0]);
    closes.extend([50.0, 49.0, 48.0, 47.0]);
    closes
}

pub fn csv_content(series: &PriceSeries) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for bar in series {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    out
}
