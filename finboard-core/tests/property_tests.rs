//! Property tests for the simulator, staleness and symbol parsing.
//!
//! Uses proptest to verify:
//! 1. Simulated market data is shape-valid for every symbol and period
//! 2. The unknown-symbol base price is a pure function of the ticker
//! 3. Staleness flips exactly at `stored_at + ttl`
//! 4. Symbol parsing normalises case and keeps keys stable

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use finboard_core::cache::{is_stale, CacheEntry, CacheKey};
use finboard_core::domain::{Period, Symbol};
use finboard_core::simulate::{base_price, generate_market, generate_news, HEADLINE_COUNT};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_ticker() -> impl Strategy<Value = String> {
    "[A-Z]{1,5}"
}

fn arb_period() -> impl Strategy<Value = Period> {
    prop::sample::select(Period::ALL.to_vec())
}

/// Any instant between 2001 and 2033.
fn arb_now() -> impl Strategy<Value = DateTime<Utc>> {
    (1_000_000_000i64..2_000_000_000i64).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

// ── 1. Simulated shape ───────────────────────────────────────────────

proptest! {
    #[test]
    fn simulated_market_is_shape_valid(
        ticker in arb_ticker(),
        period in arb_period(),
        now in arb_now(),
        seed in any::<u64>(),
    ) {
        let symbol = Symbol::parse(&ticker).unwrap();
        let m = generate_market(&symbol, period, now, &mut StdRng::seed_from_u64(seed));

        prop_assert!(!m.time_series.is_empty());
        for w in m.time_series.windows(2) {
            prop_assert!(w[0].timestamp < w[1].timestamp);
        }
        prop_assert!((m.change - (m.price - m.previous_close)).abs() < 1e-6);
        for p in &m.time_series {
            prop_assert!(p.high >= p.open.max(p.close));
            prop_assert!(p.low <= p.open.min(p.close));
            prop_assert!(p.low > 0.0);
        }
        prop_assert_eq!(m.price, m.time_series.last().unwrap().close);
        prop_assert!(m.is_consistent());
    }

    #[test]
    fn simulated_news_has_every_headline(
        ticker in arb_ticker(),
        now in arb_now(),
        seed in any::<u64>(),
    ) {
        let symbol = Symbol::parse(&ticker).unwrap();
        let news = generate_news(&symbol, now, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(news.articles.len(), HEADLINE_COUNT);
        for a in &news.articles {
            prop_assert!(a.published_at_utc <= now);
            prop_assert!(now - a.published_at_utc <= chrono::Duration::days(7));
        }
    }
}

// ── 2. Base price determinism ────────────────────────────────────────

proptest! {
    #[test]
    fn base_price_is_deterministic(ticker in "[A-Z0-9]{1,8}") {
        let a = base_price(&ticker);
        let b = base_price(&ticker);
        prop_assert_eq!(a, b);
        prop_assert!(a >= 100.0);
    }
}

// ── 3. Staleness boundary ────────────────────────────────────────────

proptest! {
    #[test]
    fn staleness_flips_at_ttl(
        stored_at in 0i64..2_000_000_000_000,
        ttl_ms in 1u64..10_000_000_000,
    ) {
        let entry = CacheEntry {
            key: "newsData_AAPL".into(),
            payload: serde_json::Value::Null,
            stored_at_millis: stored_at,
        };
        let ttl = Duration::from_millis(ttl_ms);
        let expiry = stored_at + ttl_ms as i64;

        prop_assert!(is_stale(None, ttl, stored_at));
        prop_assert!(!is_stale(Some(&entry), ttl, stored_at));
        prop_assert!(!is_stale(Some(&entry), ttl, expiry - 1));
        prop_assert!(is_stale(Some(&entry), ttl, expiry));
    }
}

// ── 4. Symbol normalisation ──────────────────────────────────────────

proptest! {
    #[test]
    fn case_does_not_change_keys(ticker in "[a-zA-Z]{1,6}", period in arb_period()) {
        let lower = Symbol::parse(&ticker.to_lowercase()).unwrap();
        let upper = Symbol::parse(&ticker.to_uppercase()).unwrap();
        prop_assert_eq!(CacheKey::market(&lower, period), CacheKey::market(&upper, period));
        prop_assert_eq!(CacheKey::news(&lower), CacheKey::news(&upper));
    }

    #[test]
    fn period_labels_round_trip(period in arb_period()) {
        let parsed: Period = period.label().parse().unwrap();
        prop_assert_eq!(parsed, period);
    }
}
