//! Finboard CLI: load market data and news with caching and simulated fallback.
//!
//! Commands:
//! - `load`: market snapshot + news for one symbol (cache, remote, or simulated)
//! - `refresh`: invalidate and reload one symbol
//! - `warm`: prefetch a watchlist in parallel
//! - `simulate`: run the simulated generator directly
//! - `cache status`: list cached entries, their age and size
//! - `cache clear`: remove all entries, or one symbol's

mod export;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use finboard_core::cache::FileCacheStore;
use finboard_core::rng::RngHierarchy;
use finboard_core::simulate::{generate_market, generate_news};
use finboard_core::source::RapidApiSource;
use finboard_core::{
    DataKind, DataLoader, DataOrigin, FinboardConfig, LoadResult, LoadScope, Period, Symbol,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "finboard.toml";

#[derive(Parser)]
#[command(
    name = "finboard",
    about = "Finboard CLI: market data and news with a TTL cache and simulated fallback"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file. Defaults to ./finboard.toml if it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache directory. Overrides [cache] dir.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Offline mode: never contact the remote API.
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    /// Debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Market,
    Dashboard,
}

impl From<ScopeArg> for LoadScope {
    fn from(s: ScopeArg) -> Self {
        match s {
            ScopeArg::Market => LoadScope::MarketPage,
            ScopeArg::Dashboard => LoadScope::Dashboard,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load market data and news for a symbol.
    Load {
        /// Ticker, optionally with exchange (AAPL, AAPL:NASDAQ).
        symbol: Symbol,

        /// Chart period: 1D, 5D, 1M, 3M, 6M, 1Y, MAX.
        #[arg(long, default_value = "1D")]
        period: Period,

        /// Which view's TTL table to apply.
        #[arg(long, value_enum, default_value_t = ScopeArg::Market)]
        scope: ScopeArg,

        /// Invalidate cached entries first.
        #[arg(long, default_value_t = false)]
        refresh: bool,

        /// Number of headlines to print.
        #[arg(long, default_value_t = 5)]
        news: usize,

        /// Print the full result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write the price series to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Invalidate and reload a symbol.
    Refresh {
        symbol: Symbol,

        #[arg(long, default_value = "1D")]
        period: Period,

        #[arg(long, value_enum, default_value_t = ScopeArg::Market)]
        scope: ScopeArg,
    },
    /// Prefetch a watchlist in parallel.
    Warm {
        #[arg(required = true)]
        symbols: Vec<Symbol>,

        #[arg(long, default_value = "1D")]
        period: Period,

        #[arg(long, value_enum, default_value_t = ScopeArg::Dashboard)]
        scope: ScopeArg,
    },
    /// Generate simulated data without touching cache or network.
    Simulate {
        symbol: Symbol,

        #[arg(long, default_value = "1D")]
        period: Period,

        /// Master seed. Defaults to [simulation] seed, else random.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached entries with age and size.
    Status,
    /// Remove cached entries.
    Clear {
        /// Only remove this symbol's entries.
        #[arg(long)]
        symbol: Option<Symbol>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let cache_dir = resolve_cache_dir(cli.cache_dir.clone(), &config)?;

    match cli.command {
        Commands::Load {
            symbol,
            period,
            scope,
            refresh,
            news,
            json,
            csv,
        } => {
            let loader = build_loader(&config, &cache_dir, cli.offline, scope.into())?;
            let result = if refresh {
                loader.refresh(&symbol, period)
            } else {
                loader.load(&symbol, period)
            };
            if let Some(path) = csv {
                export::write_series_csv(&path, &result.market)?;
                println!("Series written to: {}", path.display());
            }
            print_result(&result, period, news, json)
        }
        Commands::Refresh {
            symbol,
            period,
            scope,
        } => {
            let loader = build_loader(&config, &cache_dir, cli.offline, scope.into())?;
            let result = loader.refresh(&symbol, period);
            print_result(&result, period, 5, false)
        }
        Commands::Warm {
            symbols,
            period,
            scope,
        } => {
            let loader = build_loader(&config, &cache_dir, cli.offline, scope.into())?;
            run_warm(&loader, &symbols, period);
            Ok(())
        }
        Commands::Simulate {
            symbol,
            period,
            seed,
            json,
        } => run_simulate(&symbol, period, seed.or(config.simulation.seed), json),
        Commands::Cache { action } => match action {
            CacheAction::Status => run_cache_status(&cache_dir),
            CacheAction::Clear { symbol } => run_cache_clear(&cache_dir, symbol.as_ref()),
        },
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<FinboardConfig> {
    match path {
        Some(p) => FinboardConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => FinboardConfig::from_file_or_default(Path::new(DEFAULT_CONFIG))
            .with_context(|| format!("failed to load {DEFAULT_CONFIG}")),
    }
}

fn resolve_cache_dir(flag: Option<PathBuf>, config: &FinboardConfig) -> Result<PathBuf> {
    if let Some(dir) = flag.or_else(|| config.cache.dir.clone()) {
        return Ok(dir);
    }
    dirs::cache_dir()
        .map(|d| d.join("finboard"))
        .context("no platform cache directory; pass --cache-dir")
}

fn build_loader(
    config: &FinboardConfig,
    cache_dir: &Path,
    offline: bool,
    scope: LoadScope,
) -> Result<DataLoader> {
    let store = Arc::new(FileCacheStore::new(cache_dir));
    let rng = config
        .simulation
        .seed
        .map(RngHierarchy::new)
        .unwrap_or_else(RngHierarchy::from_entropy);

    let mut loader = DataLoader::new(store)
        .with_ttl(config.ttl.clone())
        .with_scope(scope)
        .with_rng(rng);

    if !offline {
        let api_key = config.api.api_key();
        if api_key.is_none() {
            tracing::warn!(
                key_env = %config.api.key_env,
                "no API key configured, using simulated data"
            );
        }
        let breaker = Arc::new(config.breaker.build());
        let source = RapidApiSource::new(&config.api, api_key, breaker)
            .context("failed to create remote source")?;
        loader = loader.with_source(Arc::new(source));
    }

    Ok(loader)
}

fn run_warm(loader: &DataLoader, symbols: &[Symbol], period: Period) {
    let results = loader.load_many(symbols, period);

    println!("{:<10} {:>12} {:>9}  {:<10} {:<10}", "Symbol", "Price", "Change", "Market", "News");
    println!("{}", "-".repeat(56));
    for (symbol, r) in &results {
        println!(
            "{:<10} {:>12.2} {:>8.2}%  {:<10} {:<10}",
            symbol.ticker(),
            r.market.price,
            r.market.change_percent,
            r.market_origin,
            r.news_origin
        );
    }

    let fallbacks = results.iter().filter(|(_, r)| r.used_fallback).count();
    if fallbacks > 0 {
        println!();
        println!("WARNING: {fallbacks} of {} symbol(s) used simulated data", results.len());
    }
}

fn run_simulate(symbol: &Symbol, period: Period, seed: Option<u64>, json: bool) -> Result<()> {
    let rng = seed
        .map(RngHierarchy::new)
        .unwrap_or_else(RngHierarchy::from_entropy);
    let now = Utc::now();
    let market = generate_market(
        symbol,
        period,
        now,
        &mut rng.rng_for(DataKind::Market, symbol.ticker(), period),
    );
    let news = generate_news(
        symbol,
        now,
        &mut rng.rng_for(DataKind::News, symbol.ticker(), period),
    );

    let result = LoadResult {
        market,
        news,
        used_fallback: true,
        market_origin: DataOrigin::Simulated,
        news_origin: DataOrigin::Simulated,
    };
    print_result(&result, period, 5, json)?;
    if !json {
        println!("Seed: {}", rng.master_seed());
    }
    Ok(())
}

fn print_result(result: &LoadResult, period: Period, news_count: usize, json: bool) -> Result<()> {
    if json {
        let body = serde_json::to_string_pretty(result).context("failed to serialize result")?;
        println!("{body}");
        return Ok(());
    }

    let m = &result.market;
    println!();
    println!("=== {} ({}) ===", m.name, m.symbol);
    if let Some(exchange) = &m.exchange {
        println!("Exchange:       {exchange}");
    }
    println!(
        "Price:          {:.2} {}",
        m.price,
        m.currency.as_deref().unwrap_or("")
    );
    println!(
        "Change:         {:+.2} ({:+.2}%)",
        m.change, m.change_percent
    );
    println!("Prev Close:     {:.2}", m.previous_close);
    println!("Range:          {:.2} - {:.2}", m.day_low, m.day_high);
    println!("Volume:         {}", m.volume);
    println!(
        "Series:         {} points ({period}){}",
        m.time_series.len(),
        match (m.first_timestamp(), m.last_timestamp()) {
            (Some(a), Some(b)) => format!(", {} to {}", fmt_time(a), fmt_time(b)),
            _ => String::new(),
        }
    );
    println!("Sources:        market={} news={}", result.market_origin, result.news_origin);

    let top = result.news.top(news_count);
    if !top.is_empty() {
        println!();
        println!("--- News ---");
        for a in top {
            println!("{}  {:<20} {}", fmt_time(a.published_at_utc), a.source, a.title);
        }
    }

    if result.used_fallback {
        println!();
        println!("WARNING: showing simulated data (remote source unavailable or not configured)");
    }
    println!();
    Ok(())
}

fn fmt_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let store = FileCacheStore::new(cache_dir);
    let entries = store.entries();
    if entries.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    let now = Utc::now().timestamp_millis();
    let total_size: u64 = entries.iter().map(|e| e.size_bytes).sum();

    println!("Cache: {}", cache_dir.display());
    println!("Entries: {}", entries.len());
    println!("Total size: {}", format_size(total_size));
    println!();
    println!("{:<32} {:>12} {:>10}", "Key", "Age", "Size");
    println!("{}", "-".repeat(56));
    for e in &entries {
        let age = e
            .stored_at_millis
            .map(|ts| format_age(now.saturating_sub(ts)))
            .unwrap_or_else(|| "(no stamp)".into());
        println!(
            "{:<32} {:>12} {:>10}",
            e.key.as_str(),
            age,
            format_size(e.size_bytes)
        );
    }

    Ok(())
}

fn run_cache_clear(cache_dir: &Path, symbol: Option<&Symbol>) -> Result<()> {
    let store = FileCacheStore::new(cache_dir);
    let removed = match symbol {
        Some(s) => store.clear_symbol(s.ticker()),
        None => store.clear(),
    };
    match symbol {
        Some(s) => println!("Removed {removed} entr(ies) for {s}."),
        None => println!("Removed {removed} entr(ies)."),
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn format_age(millis: i64) -> String {
    let secs = millis.max(0) / 1000;
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_load_with_options() {
        let cli = Cli::try_parse_from([
            "finboard", "load", "msft", "--period", "3m", "--scope", "dashboard", "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Load {
                symbol,
                period,
                scope,
                json,
                ..
            } => {
                assert_eq!(symbol.ticker(), "MSFT");
                assert_eq!(period, Period::ThreeMonths);
                assert!(matches!(scope, ScopeArg::Dashboard));
                assert!(json);
            }
            _ => panic!("expected load"),
        }
    }

    #[test]
    fn rejects_unknown_period_and_bad_symbol() {
        assert!(Cli::try_parse_from(["finboard", "load", "AAPL", "--period", "2W"]).is_err());
        assert!(Cli::try_parse_from(["finboard", "load", "AA PL"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["finboard", "warm", "AAPL", "SPY", "--offline", "-v"]).unwrap();
        assert!(cli.offline);
        assert!(cli.verbose);
    }

    #[test]
    fn cache_dir_flag_wins_over_config() {
        let config = FinboardConfig::from_toml("[cache]\ndir = \"/from/config\"").unwrap();
        assert_eq!(
            resolve_cache_dir(Some(PathBuf::from("/from/flag")), &config).unwrap(),
            PathBuf::from("/from/flag")
        );
        assert_eq!(
            resolve_cache_dir(None, &config).unwrap(),
            PathBuf::from("/from/config")
        );
    }

    #[test]
    fn offline_loader_has_no_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let loader =
            build_loader(&FinboardConfig::default(), dir.path(), true, LoadScope::Dashboard)
                .unwrap();
        assert!(loader.credentials_absent());
        assert_eq!(loader.scope(), LoadScope::Dashboard);
    }

    #[test]
    fn size_and_age_formatting() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_age(42_000), "42s");
        assert_eq!(format_age(5 * 60_000), "5m");
        assert_eq!(format_age(90 * 60_000), "1h 30m");
        assert_eq!(format_age(26 * 3_600_000), "1d 2h");
        assert_eq!(format_age(-5), "0s");
    }
}
