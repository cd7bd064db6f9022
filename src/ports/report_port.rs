//! Signal report port trait.

use crate::domain::error::StocksigError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::SignalPair;
use std::path::Path;

/// Port for handing generated signals to a chart or spreadsheet consumer.
pub trait ReportPort {
    fn write_signals(
        &self,
        ticker: &str,
        series: &PriceSeries,
        signals: &SignalPair,
        output_path: &Path,
    ) -> Result<(), StocksigError>;
}
