//! RapidAPI "real-time finance data" source.
//!
//! Fetches price history from `/stock-time-series-yahoo-finance` and news from
//! `/stock-news`. Handles credentials, the circuit breaker, optional retries
//! with exponential backoff, and mapping the wire format onto domain types.
//!
//! The upstream payload is loosely specified, so mapping is defensive: the
//! series is re-sorted, derived fields are recomputed from `price` and
//! `previous_close`, and anything structurally missing is a format error.

use super::circuit_breaker::CircuitBreaker;
use super::MarketDataSource;
use crate::config::ApiConfig;
use crate::domain::{Article, MarketDataResult, NewsResult, Period, PricePoint, Symbol};
use crate::error::DataError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const MARKET_PATH: &str = "stock-time-series-yahoo-finance";
const NEWS_PATH: &str = "stock-news";

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct WireMarket {
    symbol: Option<String>,
    name: Option<String>,
    exchange: Option<String>,
    currency: Option<String>,
    price: Option<f64>,
    previous_close: Option<f64>,
    day_high: Option<f64>,
    day_low: Option<f64>,
    volume: Option<f64>,
    time_series: Option<Vec<WirePoint>>,
}

#[derive(Debug, Deserialize)]
struct WirePoint {
    datetime: String,
    open: Option<f64>,
    close: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireNews {
    symbol: Option<String>,
    news: Option<Vec<WireArticle>>,
}

#[derive(Debug, Deserialize)]
struct WireArticle {
    article_title: Option<String>,
    article_url: Option<String>,
    article_photo_url: Option<String>,
    source: Option<String>,
    post_time_utc: Option<String>,
}

pub struct RapidApiSource {
    client: reqwest::blocking::Client,
    base_url: String,
    host: String,
    api_key: Option<String>,
    language: String,
    news_exchange: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl RapidApiSource {
    pub fn new(
        config: &ApiConfig,
        api_key: Option<String>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            host: config.host.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            language: config.language.clone(),
            news_exchange: config.news_exchange.clone(),
            circuit_breaker,
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// GET `{base_url}/{path}` with retry and circuit breaker logic, decoding
    /// the body as `T`. With `force`, an open breaker does not block the
    /// request; results are still recorded.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        symbol: &str,
        force: bool,
    ) -> Result<T, DataError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(DataError::MissingCredentials {
                provider: self.name().to_string(),
            });
        };
        if !force && !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = format!("{}/{path}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                std::thread::sleep(delay);
                if !force && !self.circuit_breaker.is_allowed() {
                    return Err(DataError::CircuitBreakerTripped);
                }
            }

            let sent = self
                .client
                .get(&url)
                .query(query)
                .header("x-rapidapi-key", api_key)
                .header("x-rapidapi-host", &self.host)
                .send();

            let resp = match sent {
                Ok(resp) => resp,
                Err(e) => {
                    self.circuit_breaker.record_failure();
                    let err = DataError::NetworkUnreachable(e.to_string());
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            };

            let status = resp.status();
            // Bad or unsubscribed key: retrying cannot help.
            if status == reqwest::StatusCode::FORBIDDEN
                || status == reqwest::StatusCode::UNAUTHORIZED
            {
                self.circuit_breaker.trip();
                return Err(DataError::HttpStatus {
                    status: status.as_u16(),
                    symbol: symbol.to_string(),
                });
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            if status.is_client_error() {
                return Err(DataError::HttpStatus {
                    status: status.as_u16(),
                    symbol: symbol.to_string(),
                });
            }
            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::HttpStatus {
                    status: status.as_u16(),
                    symbol: symbol.to_string(),
                });
                continue;
            }

            let body: T = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse response for {symbol}: {e}"
                ))
            })?;
            self.circuit_breaker.record_success();
            return Ok(body);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }

    fn market(
        &self,
        symbol: &Symbol,
        period: Period,
        force: bool,
    ) -> Result<MarketDataResult, DataError> {
        let ticker = symbol.ticker();
        let envelope: Envelope<WireMarket> = self.get_json(
            MARKET_PATH,
            &[("symbol", ticker), ("period", period.label())],
            ticker,
            force,
        )?;
        parse_market(ticker, envelope)
    }

    fn news(&self, symbol: &Symbol, force: bool) -> Result<NewsResult, DataError> {
        let qualified = symbol.qualified(&self.news_exchange);
        let envelope: Envelope<WireNews> = self.get_json(
            NEWS_PATH,
            &[("symbol", qualified.as_str()), ("language", self.language.as_str())],
            symbol.ticker(),
            force,
        )?;
        parse_news(symbol.ticker(), envelope)
    }
}

impl MarketDataSource for RapidApiSource {
    fn name(&self) -> &str {
        "rapidapi"
    }

    fn fetch_market(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<MarketDataResult, DataError> {
        self.market(symbol, period, false)
    }

    fn fetch_news(&self, symbol: &Symbol) -> Result<NewsResult, DataError> {
        self.news(symbol, false)
    }

    fn force_fetch_market(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<MarketDataResult, DataError> {
        self.market(symbol, period, true)
    }

    fn force_fetch_news(&self, symbol: &Symbol) -> Result<NewsResult, DataError> {
        self.news(symbol, true)
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

fn unwrap_envelope<T>(symbol: &str, envelope: Envelope<T>) -> Result<T, DataError> {
    if envelope
        .status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("error"))
    {
        let detail = envelope
            .error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no detail".into());
        return Err(DataError::ResponseFormatChanged(format!(
            "provider returned error for {symbol}: {detail}"
        )));
    }
    envelope
        .data
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("no data for {symbol}")))
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or a bare date.
pub(crate) fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

fn parse_market(
    symbol: &str,
    envelope: Envelope<WireMarket>,
) -> Result<MarketDataResult, DataError> {
    let data = unwrap_envelope(symbol, envelope)?;

    let price = data
        .price
        .filter(|p| p.is_finite())
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("no price for {symbol}")))?;

    let wire_series = data.time_series.ok_or_else(|| {
        DataError::ResponseFormatChanged(format!("no time series for {symbol}"))
    })?;

    let mut series: Vec<PricePoint> = Vec::with_capacity(wire_series.len());
    for point in wire_series {
        let timestamp = parse_utc(&point.datetime).ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("invalid datetime: {}", point.datetime))
        })?;
        // Points without a close are holidays / halted sessions.
        let Some(close) = point.close.filter(|c| c.is_finite()) else {
            continue;
        };
        let open = point.open.filter(|o| o.is_finite()).unwrap_or(close);
        let high = point.high.filter(|h| h.is_finite()).unwrap_or(open.max(close));
        let low = point.low.filter(|l| l.is_finite()).unwrap_or(open.min(close));
        series.push(PricePoint {
            timestamp,
            open,
            close,
            high: high.max(open).max(close),
            low: low.min(open).min(close),
            volume: point.volume.unwrap_or(0.0).max(0.0) as u64,
        });
    }

    series.sort_by_key(|p| p.timestamp);
    series.dedup_by_key(|p| p.timestamp);

    if series.is_empty() {
        return Err(DataError::ResponseFormatChanged(format!(
            "empty time series for {symbol}"
        )));
    }

    let previous_close = data
        .previous_close
        .filter(|p| p.is_finite())
        .unwrap_or(series[0].open);
    let change = price - previous_close;
    let change_percent = if previous_close != 0.0 {
        change / previous_close * 100.0
    } else {
        0.0
    };
    let day_high = data
        .day_high
        .unwrap_or_else(|| series.iter().map(|p| p.high).fold(f64::MIN, f64::max));
    let day_low = data
        .day_low
        .unwrap_or_else(|| series.iter().map(|p| p.low).fold(f64::MAX, f64::min));

    Ok(MarketDataResult {
        symbol: data.symbol.unwrap_or_else(|| symbol.to_string()),
        name: data.name.unwrap_or_else(|| symbol.to_string()),
        exchange: data.exchange,
        currency: data.currency,
        price,
        previous_close,
        change,
        change_percent,
        day_high,
        day_low,
        volume: data.volume.unwrap_or(0.0).max(0.0) as u64,
        time_series: series,
    })
}

fn parse_news(symbol: &str, envelope: Envelope<WireNews>) -> Result<NewsResult, DataError> {
    let data = unwrap_envelope(symbol, envelope)?;
    let wire_articles = data
        .news
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("no news array for {symbol}")))?;

    let articles = wire_articles
        .into_iter()
        .filter_map(|a| {
            Some(Article {
                title: a.article_title?,
                url: a.article_url?,
                photo_url: a.article_photo_url,
                source: a.source.unwrap_or_else(|| "Unknown".into()),
                published_at_utc: parse_utc(a.post_time_utc.as_deref()?)?,
            })
        })
        .collect();

    let ticker = data
        .symbol
        .as_deref()
        .map(|s| s.split(':').next().unwrap_or(s).to_string())
        .unwrap_or_else(|| symbol.to_string());

    Ok(NewsResult {
        symbol: ticker,
        articles,
    })
}
