//! Market snapshot plus price history for one symbol and period.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point of the price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
}

impl PricePoint {
    /// high >= max(open, close) and low <= min(open, close).
    pub fn is_sane(&self) -> bool {
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }
}

/// Market data as consumed by the dashboard, regardless of whether it was
/// fetched, cached or simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataResult {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    pub price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub change_percent: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: u64,
    pub time_series: Vec<PricePoint>,
}

impl MarketDataResult {
    /// Checks the invariants every producer must honour: `change` agrees with
    /// `price - previous_close`, and the series is non-empty and ascending.
    pub fn is_consistent(&self) -> bool {
        let expected = self.price - self.previous_close;
        let tolerance = 1e-6 * self.price.abs().max(1.0);
        (self.change - expected).abs() <= tolerance
            && !self.time_series.is_empty()
            && self
                .time_series
                .windows(2)
                .all(|w| w[0].timestamp < w[1].timestamp)
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.time_series.first().map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.time_series.last().map(|p| p.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(minute: u32, close: f64) -> PricePoint {
        PricePoint {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 14, minute, 0).unwrap(),
            open: close - 0.5,
            close,
            high: close + 1.0,
            low: close - 1.0,
            volume: 1_000,
        }
    }

    fn sample() -> MarketDataResult {
        MarketDataResult {
            symbol: "AAPL".into(),
            name: "Apple Inc.".into(),
            exchange: Some("NASDAQ".into()),
            currency: Some("USD".into()),
            price: 176.0,
            previous_close: 174.5,
            change: 1.5,
            change_percent: 1.5 / 174.5 * 100.0,
            day_high: 177.0,
            day_low: 173.5,
            volume: 5_000,
            time_series: vec![point(30, 175.0), point(35, 176.0)],
        }
    }

    #[test]
    fn consistent_sample() {
        assert!(sample().is_consistent());
    }

    #[test]
    fn change_mismatch_is_inconsistent() {
        let mut m = sample();
        m.change = 3.0;
        assert!(!m.is_consistent());
    }

    #[test]
    fn unordered_series_is_inconsistent() {
        let mut m = sample();
        m.time_series.reverse();
        assert!(!m.is_consistent());
    }

    #[test]
    fn empty_series_is_inconsistent() {
        let mut m = sample();
        m.time_series.clear();
        assert!(!m.is_consistent());
    }

    #[test]
    fn point_sanity() {
        assert!(point(30, 100.0).is_sane());
        let mut p = point(30, 100.0);
        p.low = 100.0;
        assert!(!p.is_sane());
    }
}
