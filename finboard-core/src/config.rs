//! `finboard.toml` configuration.
//!
//! Every section and field is optional; a missing file or an empty one yields
//! the defaults. Example:
//!
//! ```toml
//! [api]
//! key_env = "RAPIDAPI_KEY"
//! timeout_secs = 30
//!
//! [cache]
//! dir = "/tmp/finboard"
//!
//! [ttl]
//! news_secs = 1800
//!
//! [simulation]
//! seed = 42
//! ```

use crate::source::CircuitBreaker;
use crate::ttl::TtlPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinboardConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub ttl: TtlPolicy,
    pub simulation: SimulationConfig,
    pub breaker: BreakerConfig,
}

/// Remote finance API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub host: String,
    /// Inline key. Takes precedence over `key_env`.
    pub key: Option<String>,
    /// Environment variable holding the key.
    pub key_env: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// Exchange appended to bare tickers for the news endpoint.
    pub news_exchange: String,
    pub language: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://real-time-finance-data.p.rapidapi.com".into(),
            host: "real-time-finance-data.p.rapidapi.com".into(),
            key: None,
            key_env: "RAPIDAPI_KEY".into(),
            timeout_secs: 30,
            max_retries: 0,
            retry_base_delay_ms: 500,
            news_exchange: "NYSE".into(),
            language: "en".into(),
        }
    }
}

impl ApiConfig {
    /// The configured key, falling back to the `key_env` variable. Blank
    /// values count as absent.
    pub fn api_key(&self) -> Option<String> {
        self.key
            .clone()
            .or_else(|| std::env::var(&self.key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory. The CLI defaults to the platform cache dir.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed master seed. Unset means a fresh seed per process.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub cooldown_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_secs: 30 * 60,
        }
    }
}

impl BreakerConfig {
    pub fn build(&self) -> CircuitBreaker {
        CircuitBreaker::new(Duration::from_secs(self.cooldown_secs), self.failure_threshold)
    }
}

impl FinboardConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Like [`from_file`](Self::from_file), but a missing file gives defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
