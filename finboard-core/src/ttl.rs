//! Time-to-live policy for cached market data and news.
//!
//! Shorter-horizon views refresh more aggressively. The dashboard and the
//! market page historically used different news TTLs (24h vs 1h); both are
//! kept and selected by [`LoadScope`].

use crate::domain::{DataKind, Period};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Which view is asking. Selects the TTL table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadScope {
    /// Market research page: per-period market TTLs, 1h news.
    #[default]
    MarketPage,
    /// Dashboard summary: flat 15m market TTL, 24h news.
    Dashboard,
}

/// TTLs in seconds. Every field can be overridden from `[ttl]` in the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlPolicy {
    pub market_intraday_secs: u64,
    pub market_five_day_secs: u64,
    pub market_short_secs: u64,
    pub market_long_secs: u64,
    pub dashboard_market_secs: u64,
    pub news_secs: u64,
    pub dashboard_news_secs: u64,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            market_intraday_secs: 5 * MINUTE,
            market_five_day_secs: 30 * MINUTE,
            market_short_secs: HOUR,
            market_long_secs: DAY,
            dashboard_market_secs: 15 * MINUTE,
            news_secs: HOUR,
            dashboard_news_secs: DAY,
        }
    }
}

impl TtlPolicy {
    pub fn ttl(&self, kind: DataKind, period: Period, scope: LoadScope) -> Duration {
        let secs = match (scope, kind) {
            (LoadScope::MarketPage, DataKind::Market) => match period {
                Period::OneDay => self.market_intraday_secs,
                Period::FiveDays => self.market_five_day_secs,
                Period::OneMonth | Period::ThreeMonths => self.market_short_secs,
                Period::SixMonths | Period::OneYear | Period::Max => self.market_long_secs,
            },
            (LoadScope::Dashboard, DataKind::Market) => self.dashboard_market_secs,
            (LoadScope::MarketPage, DataKind::News) => self.news_secs,
            (LoadScope::Dashboard, DataKind::News) => self.dashboard_news_secs,
        };
        Duration::from_secs(secs)
    }
}
