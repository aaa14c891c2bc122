//! End-to-end loader scenarios against the on-disk cache store.
//!
//! Tests:
//! 1. A fresh cached AAPL 1M market entry suppresses the market fetch
//! 2. An always-failing source yields shape-valid simulated data
//! 3. Two 1D loads within five minutes make one market call
//! 4. Refresh clears both entries and fetches exactly once per kind
//! 5. Entries written by one loader are read back by another (persistence)
//! 6. Watchlist warm-up loads every symbol

use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use finboard_core::cache::{CacheKey, CacheStore, FileCacheStore};
use finboard_core::clock::ManualClock;
use finboard_core::domain::{
    Article, DataOrigin, MarketDataResult, NewsResult, Period, PricePoint, Symbol,
};
use finboard_core::rng::RngHierarchy;
use finboard_core::source::MarketDataSource;
use finboard_core::{DataError, DataLoader, LoadResult};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_cache_dir() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "finboard_loader_scenarios_{}_{id}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 6, 15, 0, 0).unwrap()
}

fn sym(s: &str) -> Symbol {
    Symbol::parse(s).unwrap()
}

/// Two-point hand-built series, recognisable by its name.
fn remote_market(symbol: &Symbol) -> MarketDataResult {
    let t0 = start() - chrono::Duration::days(1);
    MarketDataResult {
        symbol: symbol.ticker().to_string(),
        name: format!("{} (live)", symbol.ticker()),
        exchange: Some("NASDAQ".into()),
        currency: Some("USD".into()),
        price: 101.0,
        previous_close: 100.0,
        change: 1.0,
        change_percent: 1.0,
        day_high: 102.0,
        day_low: 99.0,
        volume: 1_000,
        time_series: vec![
            PricePoint {
                timestamp: t0,
                open: 100.0,
                close: 100.5,
                high: 101.0,
                low: 99.0,
                volume: 500,
            },
            PricePoint {
                timestamp: start(),
                open: 100.5,
                close: 101.0,
                high: 102.0,
                low: 100.0,
                volume: 500,
            },
        ],
    }
}

fn remote_news(symbol: &Symbol) -> NewsResult {
    NewsResult {
        symbol: symbol.ticker().to_string(),
        articles: vec![Article {
            title: format!("{} live headline", symbol.ticker()),
            url: "https://news.example/1".into(),
            photo_url: None,
            source: "Reuters".into(),
            published_at_utc: start(),
        }],
    }
}

#[derive(Default)]
struct StubSource {
    reject: bool,
    market_calls: AtomicUsize,
    news_calls: AtomicUsize,
}

impl StubSource {
    fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    fn market_calls(&self) -> usize {
        self.market_calls.load(Ordering::SeqCst)
    }

    fn news_calls(&self) -> usize {
        self.news_calls.load(Ordering::SeqCst)
    }
}

impl MarketDataSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    fn fetch_market(&self, symbol: &Symbol, _period: Period) -> Result<MarketDataResult, DataError> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(DataError::NetworkUnreachable("connection refused".into()));
        }
        Ok(remote_market(symbol))
    }

    fn fetch_news(&self, symbol: &Symbol) -> Result<NewsResult, DataError> {
        self.news_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(DataError::RateLimited {
                retry_after_secs: 60,
            });
        }
        Ok(remote_news(symbol))
    }

    fn has_credentials(&self) -> bool {
        true
    }
}

struct Harness {
    loader: DataLoader,
    store: Arc<FileCacheStore>,
    source: Arc<StubSource>,
    clock: ManualClock,
    dir: PathBuf,
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn harness(source: StubSource) -> Harness {
    let dir = temp_cache_dir();
    let clock = ManualClock::at(start());
    let store = Arc::new(FileCacheStore::with_clock(&dir, Arc::new(clock.clone())));
    let source = Arc::new(source);
    let loader = DataLoader::new(store.clone())
        .with_source(source.clone())
        .with_clock(Arc::new(clock.clone()))
        .with_rng(RngHierarchy::new(42));
    Harness {
        loader,
        store,
        source,
        clock,
        dir,
    }
}

fn assert_shape_valid(result: &LoadResult) {
    let m = &result.market;
    assert!(!m.time_series.is_empty(), "empty series");
    for w in m.time_series.windows(2) {
        assert!(w[0].timestamp < w[1].timestamp, "series not ascending");
    }
    assert!((m.change - (m.price - m.previous_close)).abs() < 1e-6);
    assert!(m.time_series.iter().all(|p| p.is_sane()));
    assert!(!result.news.articles.is_empty());
}

// ──────────────────────────────────────────────
// Scenarios
// ──────────────────────────────────────────────

#[test]
fn fresh_market_entry_suppresses_market_fetch() {
    let h = harness(StubSource::default());
    let aapl = sym("AAPL");
    let cached = remote_market(&aapl);
    h.store
        .set(
            &CacheKey::market(&aapl, Period::OneMonth),
            serde_json::to_value(&cached).unwrap(),
        )
        .unwrap();

    let result = h.loader.load(&aapl, Period::OneMonth);

    assert_eq!(h.source.market_calls(), 0);
    assert_eq!(h.source.news_calls(), 1);
    assert_eq!(result.market_origin, DataOrigin::Cache);
    assert_eq!(result.news_origin, DataOrigin::Remote);
    assert_eq!(result.market, cached);
    assert!(!result.used_fallback);
}

#[test]
fn rejecting_source_falls_back_with_valid_shapes() {
    let h = harness(StubSource::rejecting());

    for period in Period::ALL {
        let result = h.loader.load(&sym("TSLA"), period);
        assert!(result.used_fallback, "{period}");
        assert_eq!(result.market_origin, DataOrigin::Simulated);
        assert_eq!(result.news_origin, DataOrigin::Simulated);
        assert_shape_valid(&result);
    }
    // nothing simulated was written
    assert!(h.store.entries().is_empty());
}

#[test]
fn second_intraday_load_within_ttl_hits_cache() {
    let h = harness(StubSource::default());
    let aapl = sym("AAPL");

    let first = h.loader.load(&aapl, Period::OneDay);
    h.clock.advance(Duration::from_secs(4 * 60 + 59));
    let second = h.loader.load(&aapl, Period::OneDay);

    assert_eq!(h.source.market_calls(), 1);
    assert_eq!(first.market_origin, DataOrigin::Remote);
    assert_eq!(second.market_origin, DataOrigin::Cache);
    assert_eq!(first.market, second.market);

    // at exactly five minutes the entry is stale
    h.clock.advance(Duration::from_secs(1));
    h.loader.load(&aapl, Period::OneDay);
    assert_eq!(h.source.market_calls(), 2);
}

#[test]
fn refresh_clears_entries_and_fetches_once_per_kind() {
    let h = harness(StubSource::default());
    let msft = sym("MSFT");
    h.loader.load(&msft, Period::SixMonths);
    assert_eq!((h.source.market_calls(), h.source.news_calls()), (1, 1));

    let refreshed = h.loader.refresh(&msft, Period::SixMonths);
    assert_eq!((h.source.market_calls(), h.source.news_calls()), (2, 2));
    assert_eq!(refreshed.market_origin, DataOrigin::Remote);
    assert_eq!(refreshed.news_origin, DataOrigin::Remote);
}

#[test]
fn refresh_with_failing_source_leaves_cache_empty() {
    let h = harness(StubSource::rejecting());
    let msft = sym("MSFT");
    let market_key = CacheKey::market(&msft, Period::OneMonth);
    let news_key = CacheKey::news(&msft);
    h.store
        .set(&market_key, serde_json::to_value(remote_market(&msft)).unwrap())
        .unwrap();
    h.store
        .set(&news_key, serde_json::to_value(remote_news(&msft)).unwrap())
        .unwrap();

    let result = h.loader.refresh(&msft, Period::OneMonth);

    assert_eq!((h.source.market_calls(), h.source.news_calls()), (1, 1));
    assert!(result.used_fallback);
    assert!(h.store.get(&market_key).is_none());
    assert!(h.store.get(&news_key).is_none());
}

#[test]
fn cache_survives_new_loader_instance() {
    let h = harness(StubSource::default());
    let nvda = sym("NVDA");
    h.loader.load(&nvda, Period::OneYear);

    let source = Arc::new(StubSource::default());
    let second = DataLoader::new(Arc::new(FileCacheStore::new(&h.dir)))
        .with_source(source.clone())
        .with_clock(Arc::new(h.clock.clone()));
    let result = second.load(&nvda, Period::OneYear);

    assert_eq!(source.market_calls(), 0);
    assert_eq!(source.news_calls(), 0);
    assert_eq!(result.market.name, "NVDA (live)");
    assert_eq!(result.news.articles[0].title, "NVDA live headline");
}

#[test]
fn warm_loads_every_symbol() {
    let h = harness(StubSource::default());
    let symbols: Vec<Symbol> = ["AAPL", "MSFT", "GOOGL", "META", "SPY"]
        .iter()
        .map(|s| sym(s))
        .collect();

    let results = h.loader.load_many(&symbols, Period::FiveDays);

    assert_eq!(results.len(), 5);
    assert_eq!(h.source.market_calls(), 5);
    assert_eq!(h.source.news_calls(), 5);
    // 5 market + 5 news entries
    assert_eq!(h.store.entries().len(), 10);
    for (symbol, result) in results {
        assert_eq!(result.market.symbol, symbol.ticker());
        assert!(!result.used_fallback);
    }
}
