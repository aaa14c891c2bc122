//! Simulated market data and news.
//!
//! Used whenever the remote source is unreachable, uncredentialed or returns
//! something unusable. Output has exactly the shape of live data so views
//! never need to know where it came from.
//!
//! All functions are pure apart from the caller-supplied `now` and RNG.

pub mod catalog;
mod market;
mod news;

pub use catalog::{base_price, company_name, short_name};
pub use market::generate_market;
pub use news::{generate_news, HEADLINE_COUNT};
