//! Deterministic RNG hierarchy for simulated data.
//!
//! A master seed generates one sub-seed per `(kind, symbol, period)` tuple.
//! Sub-seeds are derived via BLAKE3 hashing, so the same symbol always gets
//! the same simulated series within a process no matter which views asked
//! first, and a configured seed makes the output reproducible across runs.

use crate::domain::{DataKind, Period};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Master seed drawn from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().gen())
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed. News ignores `period`.
    pub fn sub_seed(&self, kind: DataKind, ticker: &str, period: Period) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(kind.to_string().as_bytes());
        hasher.update(ticker.as_bytes());
        if kind == DataKind::Market {
            hasher.update(period.label().as_bytes());
        }
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    pub fn rng_for(&self, kind: DataKind, ticker: &str, period: Period) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(kind, ticker, period))
    }
}
