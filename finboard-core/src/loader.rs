//! Data loading with cache and fallback.
//!
//! For each data kind independently:
//! 1. A fresh cache entry that decodes is used as-is.
//! 2. Otherwise, if a credentialed source is available, fetch and cache.
//! 3. Otherwise, or if the fetch fails, generate simulated data (not cached).
//!
//! Loads never fail. A result built from any simulated part, or produced
//! while no credentials are configured, is flagged `used_fallback`.

use crate::cache::{is_stale, CacheKey, CacheStore};
use crate::clock::{Clock, SystemClock};
use crate::domain::{DataKind, DataOrigin, MarketDataResult, NewsResult, Period, Symbol};
use crate::error::DataError;
use crate::rng::RngHierarchy;
use crate::simulate;
use crate::source::MarketDataSource;
use crate::ttl::{LoadScope, TtlPolicy};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The `(market, news)` pair a view renders, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResult {
    pub market: MarketDataResult,
    pub news: NewsResult,
    pub used_fallback: bool,
    pub market_origin: DataOrigin,
    pub news_origin: DataOrigin,
}

/// Cache-then-remote-then-simulated loader for one symbol at a time.
///
/// Shared across threads; every dependency sits behind an `Arc`.
pub struct DataLoader {
    cache: Arc<dyn CacheStore>,
    source: Option<Arc<dyn MarketDataSource>>,
    ttl: TtlPolicy,
    scope: LoadScope,
    clock: Arc<dyn Clock>,
    rng: RngHierarchy,
}

impl DataLoader {
    /// An offline loader: cache plus simulation, no remote source.
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            cache,
            source: None,
            ttl: TtlPolicy::default(),
            scope: LoadScope::default(),
            clock: Arc::new(SystemClock),
            rng: RngHierarchy::from_entropy(),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn MarketDataSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_ttl(mut self, ttl: TtlPolicy) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_scope(mut self, scope: LoadScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_rng(mut self, rng: RngHierarchy) -> Self {
        self.rng = rng;
        self
    }

    pub fn scope(&self) -> LoadScope {
        self.scope
    }

    pub fn rng(&self) -> &RngHierarchy {
        &self.rng
    }

    /// True when no source is configured or it has no API key.
    pub fn credentials_absent(&self) -> bool {
        !self.source.as_ref().is_some_and(|s| s.has_credentials())
    }

    /// Resolve market data and news for `symbol`, each through its own
    /// cache → remote → simulated chain. Never fails.
    ///
    /// `used_fallback` is set when either kind was simulated or no
    /// credentials are configured.
    pub fn load(&self, symbol: &Symbol, period: Period) -> LoadResult {
        self.load_with(symbol, period, false)
    }

    /// Drop both cache entries, then load. Makes one fetch attempt per kind,
    /// even while the source reports itself unavailable.
    pub fn refresh(&self, symbol: &Symbol, period: Period) -> LoadResult {
        self.cache.invalidate(&CacheKey::market(symbol, period));
        self.cache.invalidate(&CacheKey::news(symbol));
        tracing::debug!(%symbol, %period, "invalidated cache for refresh");
        self.load_with(symbol, period, true)
    }

    /// Load a watchlist in parallel. Output order matches `symbols`.
    pub fn load_many(&self, symbols: &[Symbol], period: Period) -> Vec<(Symbol, LoadResult)> {
        symbols
            .par_iter()
            .map(|symbol| (symbol.clone(), self.load(symbol, period)))
            .collect()
    }

    fn load_with(&self, symbol: &Symbol, period: Period, force: bool) -> LoadResult {
        let (market, market_origin) = self.resolve(
            DataKind::Market,
            symbol,
            period,
            force,
            |source| {
                let market = if force {
                    source.force_fetch_market(symbol, period)?
                } else {
                    source.fetch_market(symbol, period)?
                };
                if !market.is_consistent() {
                    return Err(DataError::ResponseFormatChanged(format!(
                        "inconsistent market data for {symbol}"
                    )));
                }
                Ok(market)
            },
            || self.simulate_market(symbol, period),
        );

        let (news, news_origin) = self.resolve(
            DataKind::News,
            symbol,
            period,
            force,
            |source| {
                if force {
                    source.force_fetch_news(symbol)
                } else {
                    source.fetch_news(symbol)
                }
            },
            || self.simulate_news(symbol),
        );

        let used_fallback = market_origin.is_simulated()
            || news_origin.is_simulated()
            || self.credentials_absent();

        LoadResult {
            market,
            news,
            used_fallback,
            market_origin,
            news_origin,
        }
    }

    fn resolve<T, F, S>(
        &self,
        kind: DataKind,
        symbol: &Symbol,
        period: Period,
        force: bool,
        fetch: F,
        simulate: S,
    ) -> (T, DataOrigin)
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&dyn MarketDataSource) -> Result<T, DataError>,
        S: FnOnce() -> T,
    {
        let key = CacheKey::for_kind(kind, symbol, period);
        let ttl = self.ttl.ttl(kind, period, self.scope);
        let entry = self.cache.get(&key);

        if !is_stale(entry.as_ref(), ttl, self.clock.now_millis()) {
            match entry.as_ref().and_then(|e| e.decode::<T>()) {
                Some(value) => {
                    tracing::debug!(%key, "cache hit");
                    return (value, DataOrigin::Cache);
                }
                None => tracing::debug!(%key, "cached payload did not decode, refetching"),
            }
        }

        match self.fetch_remote(force, fetch) {
            Ok(value) => {
                tracing::info!(%symbol, %kind, %period, "fetched from remote");
                self.store(&key, &value);
                (value, DataOrigin::Remote)
            }
            Err(e) => {
                tracing::warn!(
                    %symbol,
                    %kind,
                    %period,
                    error = %e,
                    transient = e.is_transient(),
                    "using simulated data"
                );
                (simulate(), DataOrigin::Simulated)
            }
        }
    }

    fn fetch_remote<T, F>(&self, force: bool, fetch: F) -> Result<T, DataError>
    where
        F: FnOnce(&dyn MarketDataSource) -> Result<T, DataError>,
    {
        let source = self.source.as_deref().ok_or_else(|| {
            DataError::NetworkUnreachable("offline: no remote source configured".into())
        })?;
        if !source.has_credentials() {
            return Err(DataError::MissingCredentials {
                provider: source.name().to_string(),
            });
        }
        if !force && !source.is_available() {
            return Err(DataError::CircuitBreakerTripped);
        }
        fetch(source)
    }

    fn store<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let written = serde_json::to_value(value)
            .map_err(|e| DataError::CacheError(e.to_string()))
            .and_then(|payload| self.cache.set(key, payload));
        if let Err(e) = written {
            tracing::warn!(%key, error = %e, "cache write failed");
        }
    }

    fn simulate_market(&self, symbol: &Symbol, period: Period) -> MarketDataResult {
        let mut rng = self.rng.rng_for(DataKind::Market, symbol.ticker(), period);
        simulate::generate_market(symbol, period, self.clock.now(), &mut rng)
    }

    fn simulate_news(&self, symbol: &Symbol) -> NewsResult {
        let mut rng = self.rng.rng_for(DataKind::News, symbol.ticker(), Period::OneDay);
        simulate::generate_news(symbol, self.clock.now(), &mut rng)
    }
}
