//! OHLCV bar and price series representation.

use crate::domain::error::StocksigError;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Bars sorted ascending by timestamp with no duplicate timestamps.
///
/// Gaps between timestamps are kept as-is; nothing is filled or interpolated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Wrap bars that must already be in strictly ascending timestamp order.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, StocksigError> {
        if let Some(pos) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            let (prev, next) = (&bars[pos], &bars[pos + 1]);
            let reason = if prev.timestamp == next.timestamp {
                format!("duplicate timestamp {}", next.timestamp)
            } else {
                format!(
                    "timestamps out of order at index {}: {} after {}",
                    pos + 1,
                    next.timestamp,
                    prev.timestamp
                )
            };
            return Err(StocksigError::InvalidInput { reason });
        }
        Ok(Self { bars })
    }

    /// Sort bars by timestamp first, then validate uniqueness.
    pub fn from_unsorted(mut bars: Vec<PriceBar>) -> Result<Self, StocksigError> {
        bars.sort_by_key(|b| b.timestamp);
        Self::new(bars)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Keep only bars whose date falls inside the inclusive range.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> PriceSeries {
        let bars = self
            .bars
            .iter()
            .filter(|b| start.is_none_or(|s| b.date() >= s))
            .filter(|b| end.is_none_or(|e| b.date() <= e))
            .cloned()
            .collect();
        PriceSeries { bars }
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceBar;
    type IntoIter = std::slice::Iter<'a, PriceBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
