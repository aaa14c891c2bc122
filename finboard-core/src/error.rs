//! Structured error types for data operations.
//!
//! These are displayable in CLI output and in log lines. None of them cross
//! the loader boundary: the loader turns every remote failure into simulated
//! data and reports `used_fallback` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {symbol}")]
    HttpStatus { status: u16, symbol: String },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("no API key configured for {provider}")]
    MissingCredentials { provider: String },

    #[error("data provider unavailable (circuit breaker open)")]
    CircuitBreakerTripped,

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("invalid symbol '{input}': {reason}")]
    InvalidSymbol { input: String, reason: String },

    #[error("unknown period '{0}' (expected one of 1D, 5D, 1M, 3M, 6M, 1Y, MAX)")]
    UnknownPeriod(String),

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Errors caused by the remote side that count toward the circuit breaker.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DataError::NetworkUnreachable(_)
                | DataError::HttpStatus { .. }
                | DataError::RateLimited { .. }
        )
    }
}
