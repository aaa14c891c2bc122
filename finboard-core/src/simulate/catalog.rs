//! Fixed lookup tables for well-known tickers.

const BASE_PRICES: &[(&str, f64)] = &[
    ("AAPL", 175.5),
    ("MSFT", 410.75),
    ("AMZN", 180.3),
    ("GOOGL", 175.8),
    ("TSLA", 175.25),
    ("META", 485.0),
    ("NFLX", 625.0),
    ("NVDA", 950.25),
    ("SPY", 520.0),
    ("QQQ", 440.0),
    ("DIA", 390.0),
];

const COMPANY_NAMES: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("AMZN", "Amazon.com Inc."),
    ("GOOGL", "Alphabet Inc."),
    ("TSLA", "Tesla, Inc."),
    ("META", "Meta Platforms, Inc."),
    ("NFLX", "Netflix, Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("SPY", "SPDR S&P 500 ETF Trust"),
    ("QQQ", "Invesco QQQ Trust"),
    ("DIA", "SPDR Dow Jones Industrial Average ETF"),
];

const SHORT_NAMES: &[(&str, &str)] = &[
    ("AAPL", "Apple"),
    ("MSFT", "Microsoft"),
    ("AMZN", "Amazon"),
    ("GOOGL", "Google"),
    ("TSLA", "Tesla"),
    ("META", "Meta"),
    ("NFLX", "Netflix"),
    ("NVDA", "NVIDIA"),
    ("SPY", "S&P 500"),
    ("QQQ", "Nasdaq"),
    ("DIA", "Dow Jones"),
];

fn lookup<T: Copy>(table: &[(&str, T)], ticker: &str) -> Option<T> {
    table.iter().find(|(t, _)| *t == ticker).map(|(_, v)| *v)
}

/// Starting price for a simulated walk.
///
/// Unknown tickers get `100 + (first char code mod 10) * 50`, so the same
/// ticker always starts from the same price.
pub fn base_price(ticker: &str) -> f64 {
    lookup(BASE_PRICES, ticker).unwrap_or_else(|| {
        let first = ticker.chars().next().map(u32::from).unwrap_or(0);
        100.0 + f64::from(first % 10) * 50.0
    })
}

/// Full company name, e.g. "Apple Inc."; unknown tickers get "{TICKER} Stock".
pub fn company_name(ticker: &str) -> String {
    lookup(COMPANY_NAMES, ticker)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{ticker} Stock"))
}

/// Short display name used in headlines; unknown tickers are shown as-is.
pub fn short_name(ticker: &str) -> String {
    lookup(SHORT_NAMES, ticker)
        .map(str::to_string)
        .unwrap_or_else(|| ticker.to_string())
}
