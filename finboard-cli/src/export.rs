//! CSV export of a price series.

use anyhow::{Context, Result};
use finboard_core::domain::MarketDataResult;
use std::path::Path;

/// Render the time series as CSV.
///
/// Columns: symbol, timestamp (RFC 3339), open, high, low, close, volume
pub fn series_csv(market: &MarketDataResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["symbol", "timestamp", "open", "high", "low", "close", "volume"])?;

    for p in &market.time_series {
        wtr.write_record([
            &market.symbol,
            &p.timestamp.to_rfc3339(),
            &format!("{:.4}", p.open),
            &format!("{:.4}", p.high),
            &format!("{:.4}", p.low),
            &format!("{:.4}", p.close),
            &p.volume.to_string(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    Ok(String::from_utf8(bytes)?)
}

pub fn write_series_csv(path: &Path, market: &MarketDataResult) -> Result<()> {
    let body = series_csv(market)?;
    std::fs::write(path, body)
        .with_context(|| format!("failed to write CSV {}", path.display()))
}
