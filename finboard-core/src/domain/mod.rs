//! Domain types for the dashboard data layer

pub mod market;
pub mod news;
pub mod period;
pub mod symbol;

pub use market::{MarketDataResult, PricePoint};
pub use news::{Article, NewsResult};
pub use period::Period;
pub use symbol::Symbol;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of payload a cache entry or fetch refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Market,
    News,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Market => write!(f, "market"),
            DataKind::News => write!(f, "news"),
        }
    }
}

/// Where a loaded payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Cache,
    Remote,
    Simulated,
}

impl DataOrigin {
    pub fn is_simulated(self) -> bool {
        self == DataOrigin::Simulated
    }
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DataOrigin::Cache => "cache",
            DataOrigin::Remote => "remote",
            DataOrigin::Simulated => "simulated",
        };
        f.pad(label)
    }
}
