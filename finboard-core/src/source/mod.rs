//! Remote data source trait.
//!
//! `MarketDataSource` abstracts over where live data comes from so the loader
//! can be tested against stubs. The cache layer sits above this trait:
//! sources don't know about caching or simulation.

pub mod circuit_breaker;
pub mod rapidapi;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use rapidapi::RapidApiSource;

use crate::domain::{MarketDataResult, NewsResult, Period, Symbol};
use crate::error::DataError;

pub trait MarketDataSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Snapshot plus price history for `symbol` over `period`.
    fn fetch_market(&self, symbol: &Symbol, period: Period)
        -> Result<MarketDataResult, DataError>;

    /// Recent news for `symbol`.
    fn fetch_news(&self, symbol: &Symbol) -> Result<NewsResult, DataError>;

    /// Like [`fetch_market`](Self::fetch_market), but attempted even while
    /// the source reports itself unavailable. Used by explicit refreshes.
    fn force_fetch_market(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<MarketDataResult, DataError> {
        self.fetch_market(symbol, period)
    }

    /// Like [`fetch_news`](Self::fetch_news), ignoring availability.
    fn force_fetch_news(&self, symbol: &Symbol) -> Result<NewsResult, DataError> {
        self.fetch_news(symbol)
    }

    /// Whether an API key (or equivalent) is configured.
    fn has_credentials(&self) -> bool;

    /// Whether requests are currently allowed (not blocked by a breaker).
    fn is_available(&self) -> bool {
        true
    }
}
