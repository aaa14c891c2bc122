use super::catalog::short_name;
use crate::domain::{Article, NewsResult, Symbol};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

const SOURCES: [&str; 8] = [
    "Bloomberg",
    "CNBC",
    "Reuters",
    "Wall Street Journal",
    "Financial Times",
    "MarketWatch",
    "Barron's",
    "Investor's Business Daily",
];

/// Headline template (`{}` is the display name) and stock photo.
const HEADLINES: [(&str, &str); 8] = [
    (
        "{} Reports Strong Quarterly Earnings, Beats Expectations",
        "https://images.unsplash.com/photo-1590283603385-17ffb3a7f29f?q=80&w=300&auto=format&fit=crop",
    ),
    (
        "Analysts Raise Price Target for {} Following Product Launch",
        "https://images.unsplash.com/photo-1611974789855-9c2a0a7236a3?q=80&w=300&auto=format&fit=crop",
    ),
    (
        "{} Announces New Strategic Partnership to Expand Market Reach",
        "https://images.unsplash.com/photo-1560472355-536de3962603?q=80&w=300&auto=format&fit=crop",
    ),
    (
        "{} CEO Discusses Future Growth Strategies in Exclusive Interview",
        "https://images.unsplash.com/photo-1542744173-8e7e53415bb0?q=80&w=300&auto=format&fit=crop",
    ),
    (
        "{} Faces Regulatory Scrutiny Over Recent Business Practices",
        "https://images.unsplash.com/photo-1450101499163-c8848c66ca85?q=80&w=300&auto=format&fit=crop",
    ),
    (
        "Investors React to {}'s Latest Product Announcement",
        "https://images.unsplash.com/photo-1526628953301-3e589a6a8b74?q=80&w=300&auto=format&fit=crop",
    ),
    (
        "{} Stock Surges Following Positive Industry Trends",
        "https://images.unsplash.com/photo-1535320903710-d993d3d77d29?q=80&w=300&auto=format&fit=crop",
    ),
    (
        "Market Analysis: Is {} Overvalued in Current Market Conditions?",
        "https://images.unsplash.com/photo-1551288049-bebda4e38f71?q=80&w=300&auto=format&fit=crop",
    ),
];

pub const HEADLINE_COUNT: usize = HEADLINES.len();

const WEEK_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// One article per headline template, each from a random outlet and
/// published at a random time in the week before `now`.
pub fn generate_news<R: Rng + ?Sized>(
    symbol: &Symbol,
    now: DateTime<Utc>,
    rng: &mut R,
) -> NewsResult {
    let ticker = symbol.ticker();
    let name = short_name(ticker);
    let slug = ticker.to_ascii_lowercase();

    let articles = HEADLINES
        .iter()
        .enumerate()
        .map(|(i, (template, photo))| {
            let source = SOURCES.choose(rng).copied().unwrap_or(SOURCES[0]);
            Article {
                title: template.replace("{}", &name),
                url: format!("https://example.com/news/{slug}-{i}"),
                photo_url: Some((*photo).to_string()),
                source: source.to_string(),
                published_at_utc: now - Duration::milliseconds(rng.gen_range(0..WEEK_MILLIS)),
            }
        })
        .collect();

    NewsResult {
        symbol: ticker.to_string(),
        articles,
    }
}
