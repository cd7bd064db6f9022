//! Data access port trait.

use crate::domain::error::StocksigError;
use crate::domain::ohlcv::PriceSeries;
use chrono::{NaiveDate, NaiveDateTime};

pub trait DataPort {
    /// Load the bars for `ticker` whose date falls in the inclusive range.
    /// An open bound means "from the first bar" or "to the last bar".
    ///
    /// Returns `NoData` when the ticker is unknown or nothing falls in range.
    fn fetch_series(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, StocksigError>;

    fn list_tickers(&self) -> Result<Vec<String>, StocksigError>;

    /// First timestamp, last timestamp and bar count, or `None` for an
    /// unknown ticker.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, StocksigError>;
}
