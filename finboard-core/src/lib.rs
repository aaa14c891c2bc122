//! Finboard Core: market data and news loading for the finance dashboard.
//!
//! This crate contains everything between the dashboard views and the
//! remote finance API:
//! - Domain types (symbols, periods, market snapshots, news feeds)
//! - Cache store trait with in-memory and on-disk implementations
//! - TTL policy per data kind, period and call-site scope
//! - Remote data source (RapidAPI real-time finance) behind a circuit breaker
//! - Simulated data generator used whenever live data is unavailable
//! - Data loader tying it together with degrade-to-simulated semantics

pub mod cache;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod rng;
pub mod simulate;
pub mod source;
pub mod ttl;

pub use cache::{is_stale, CacheEntry, CacheKey, CacheStore, FileCacheStore, MemoryCacheStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, FinboardConfig};
pub use domain::{
    Article, DataKind, DataOrigin, MarketDataResult, NewsResult, Period, PricePoint, Symbol,
};
pub use error::DataError;
pub use loader::{DataLoader, LoadResult};
pub use source::{CircuitBreaker, MarketDataSource, RapidApiSource};
pub use ttl::{LoadScope, TtlPolicy};
